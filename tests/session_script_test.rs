use anyhow::Result;
use httpmock::prelude::*;
use reel_intake::utils::validation::Validate;
use reel_intake::{LocalPhotoSource, ReelError, SessionScript, Submitter, WebhookSettings, WebhookTransport};
use std::path::Path;
use tempfile::TempDir;

fn write_photos(dir: &Path, names: &[&str]) -> Result<()> {
    for name in names {
        std::fs::write(dir.join(name), format!("bytes-of-{}", name))?;
    }
    Ok(())
}

#[tokio::test]
async fn test_play_script_and_submit() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_photos(temp_dir.path(), &["a.jpg", "b.jpg", "c.png", "d.webp", "e.jpg"])?;

    let server = MockServer::start_async().await;
    let hook = server.mock_async(|when, then| {
        when.method(POST)
            .path("/hooks/reel")
            .body_contains("name=\"layout\"")
            .body_contains("freeform")
            .body_contains("filename=\"d.webp\"")
            .body_contains("bytes-of-d.webp")
            .body_contains(r#"[{"files":[0,1]},{"files":[2]},{"files":[3]}]"#)
            .body_contains("Savski venac");
        then.status(200).body("ok");
    }).await;

    let script_content = format!(
        r#"
[webhook]
endpoint = "{}"
done_delay_ms = 10

[session]
layout = {{ kind = "freeform", slots = 4 }}

[listing]
title = "Porodična kuća"
price = "€320.000"
extras = ["Dvorište"]

[[actions]]
type = "drop"
files = ["a.jpg", "b.jpg", "c.png"]

# g1 併入 g0，形成 keyframe pair
[[actions]]
type = "merge"
source = 1
target = 0

# 超過容量，應被拒絕
[[actions]]
type = "merge"
source = 1
target = 0

[[actions]]
type = "drop"
files = ["d.webp", "e.jpg"]
group = 1

[[actions]]
type = "field"
field = "location"
value = "Savski venac"
"#,
        server.url("/hooks/reel")
    );

    let script_path = temp_dir.path().join("session.toml");
    std::fs::write(&script_path, script_content)?;

    let script = SessionScript::from_file(&script_path)?;
    script.validate()?;

    let photos = LocalPhotoSource::new(temp_dir.path());
    let outcome = script.play(&photos).await?;

    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].step, 3);
    assert!(matches!(
        outcome.rejected[0].error,
        ReelError::GroupCapacityExceeded { .. }
    ));

    let session = outcome.session;
    assert_eq!(session.groups().len(), 3);
    assert_eq!(session.filled_count(), 4);
    assert_eq!(session.listing().extras, vec!["Dvorište"]);
    // e.jpg 沒有空位可放
    assert_eq!(session.previews().live_count(), 4);

    let settings = script.webhook_settings(WebhookSettings::from_lookup(|_| None));
    let submitter = Submitter::from_config(WebhookTransport::new(), &settings);
    let receipt = submitter.submit(&session).await?;

    hook.assert_async().await;
    assert_eq!(receipt.total_images, 4);
    Ok(())
}

#[tokio::test]
async fn test_fixed_layout_rejects_pairing_steps() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_photos(temp_dir.path(), &["1.jpg", "2.jpg"])?;

    let script = SessionScript::from_toml_str(
        r#"
[session]
layout = "standard"

[[actions]]
type = "drop"
files = ["1.jpg", "2.jpg"]
group = 3

[[actions]]
type = "merge"
source = 4
target = 3

[[actions]]
type = "split"
group = 0

[[actions]]
type = "clear"
group = 9
"#,
    )?;

    let outcome = script.play(&LocalPhotoSource::new(temp_dir.path())).await?;
    let steps: Vec<usize> = outcome.rejected.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![2, 3, 4]);
    assert!(matches!(outcome.rejected[0].error, ReelError::LayoutLocked { .. }));
    assert!(matches!(outcome.rejected[1].error, ReelError::LayoutLocked { .. }));
    assert!(matches!(outcome.rejected[2].error, ReelError::InvalidPosition { .. }));

    assert_eq!(outcome.session.filled_count(), 2);
    assert_eq!(outcome.session.groups().len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_missing_photo_aborts_play() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let script = SessionScript::from_toml_str(
        "[[actions]]\ntype = \"drop\"\nfiles = [\"ghost.jpg\"]\n",
    )?;
    let err = script
        .play(&LocalPhotoSource::new(temp_dir.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, ReelError::IoError(_)));
    Ok(())
}
