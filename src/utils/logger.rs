use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// HTTP 堆疊的 crate，除錯模式下也只顯示警告
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls", "httpmock"];

/// 未設定 RUST_LOG 時使用的過濾規則
pub fn default_directives(verbose: bool) -> String {
    let own = if verbose { "reel_intake=debug,info" } else { "reel_intake=info,warn" };
    QUIET_TARGETS
        .iter()
        .fold(own.to_string(), |acc, target| format!("{},{}=warn", acc, target))
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .init();
}

/// 給日誌收集器使用的結構化輸出；每筆事件帶上 span 資訊
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(build_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();
}
