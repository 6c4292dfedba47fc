use clap::Parser;
use reel_intake::domain::ports::ConfigProvider;
use reel_intake::utils::error::{ErrorSeverity, ReelError};
use reel_intake::utils::{logger, validation::Validate};
use reel_intake::{
    CliConfig, Face, LocalPhotoSource, Session, SessionScript, Submitter, WebhookSettings,
    WebhookTransport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting reel-intake");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 載入並驗證流程腳本
    tracing::info!("📁 Loading session script from: {}", config.script);
    let script = match SessionScript::from_file(&config.script) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("❌ Failed to load session script '{}': {}", config.script, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Err(e) = script.validate() {
        tracing::error!("❌ Session script validation failed: {}", e);
        fail(&e);
    }

    // 命令列 > 設定檔 > 環境變數
    let settings = script
        .webhook_settings(WebhookSettings::from_env())
        .override_endpoint(config.endpoint.as_deref());
    if let Err(e) = settings.validate() {
        fail(&e);
    }
    if !settings.has_endpoint() {
        tracing::error!("❌ Webhook endpoint is not configured; submission will be refused");
    }

    let photos = LocalPhotoSource::new(config.photos_dir());
    let outcome = match script.play(&photos).await {
        Ok(outcome) => outcome,
        Err(e) => fail(&e),
    };
    for step in &outcome.rejected {
        eprintln!("⚠️ Step {}: {}", step.step, step.error.user_friendly_message());
    }

    let session = outcome.session;
    print_arrangement(&session);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be submitted");
        match session.check_submittable() {
            Ok(()) => println!("✅ Ready to submit"),
            Err(e) => println!("⛔ Not ready: {}", e.user_friendly_message()),
        }
        let payload = session.build_payload(chrono::Utc::now());
        for (name, value) in payload.text_fields()? {
            println!("  {} = {}", name, value);
        }
        return Ok(());
    }

    let transport = WebhookTransport::with_timeout(settings.request_timeout())?;
    let submitter = Submitter::from_config(transport, &settings);

    match submitter.submit(&session).await {
        Ok(receipt) => {
            tracing::info!(
                "✅ Submitted {} photo(s) at {}",
                receipt.total_images,
                receipt.timestamp
            );
            println!(
                "✅ Submitted {} photo(s) in {} scene(s)",
                receipt.total_images,
                receipt.manifest.len()
            );
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn print_arrangement(session: &Session) {
    println!("🎬 Layout: {}", session.policy().id);
    for coord in session.coords() {
        let Some(slot) = session.slot(coord) else {
            continue;
        };
        let label = session.label(coord).unwrap_or_default();
        let marker = if session.is_keyframe(coord) { "◆" } else { " " };
        let primary = slot
            .file(Face::Primary)
            .map(|f| f.name.as_str())
            .unwrap_or("-");
        match slot.file(Face::Secondary) {
            Some(secondary) => println!("  {} {:<8} {} + {}", marker, label, primary, secondary.name),
            None => println!("  {} {:<8} {}", marker, label, primary),
        }
    }
    println!(
        "📷 {} of {} required photo(s)",
        session.filled_count(),
        session.policy().min_filled
    );
}

fn fail(e: &ReelError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    if e.is_retryable() {
        eprintln!("🔁 可以直接重新執行以再次提交");
    }

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
