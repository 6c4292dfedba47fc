use crate::domain::model::SubmissionPayload;
use crate::domain::ports::{Transport, TransportResponse};
use crate::utils::error::{ReelError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// 以 multipart/form-data POST 到影片服務的 webhook
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: Client,
}

impl WebhookTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 照片依 manifest 序號附加為 image_<n>，其後是文字欄位
    pub fn build_form(payload: &SubmissionPayload) -> Result<Form> {
        let mut form = Form::new();

        for attachment in &payload.attachments {
            let part = Part::bytes(attachment.file.data.clone())
                .file_name(attachment.file.name.clone())
                .mime_str(&attachment.file.content_type)?;
            form = form.part(SubmissionPayload::attachment_field(attachment.index), part);
        }

        for (name, value) in payload.text_fields()? {
            form = form.text(name, value);
        }

        Ok(form)
    }
}

fn unreadable_body(e: &dyn std::fmt::Display) -> String {
    format!("<unreadable body: {}>", e)
}

impl Default for WebhookTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for WebhookTransport {
    async fn send(&self, endpoint: &str, payload: &SubmissionPayload) -> Result<TransportResponse> {
        let form = Self::build_form(payload)?;

        tracing::debug!("Posting multipart submission to: {}", endpoint);
        let response = self.client.post(endpoint).multipart(form).send().await?;

        let status = response.status();
        tracing::debug!("Webhook response status: {}", status);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("⚠️ Failed to read webhook response body: {}", e);
                unreadable_body(&e)
            }
        };

        if !status.is_success() {
            tracing::error!("Webhook error response: {} {}", status.as_u16(), body);
            return Err(ReelError::TransportError {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Webhook success response: {}", body);
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::Layout;
    use crate::core::session::Session;
    use crate::domain::model::{Face, ListingField, SlotCoord, UploadFile};
    use httpmock::prelude::*;

    fn session_with(count: usize) -> Session {
        let mut session = Session::new(Layout::freeform(count)).unwrap();
        let files = (0..count)
            .map(|i| {
                UploadFile::new(
                    format!("room_{}.jpg", i),
                    format!("jpeg-bytes-{}", i).into_bytes(),
                )
            })
            .collect();
        session
            .distribute(files, SlotCoord::new(0, 0), Face::Primary)
            .unwrap();
        session.set_field(ListingField::Title, "Stan na Dorćolu");
        session.set_field(ListingField::Price, "€120.000");
        session.set_field(ListingField::Location, "Beograd");
        session
    }

    #[tokio::test]
    async fn test_send_posts_multipart_fields() {
        let server = MockServer::start_async().await;
        let hook = server.mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .header_exists("content-type")
                .body_contains("name=\"image_0\"; filename=\"room_0.jpg\"")
                .body_contains("name=\"image_1\"; filename=\"room_1.jpg\"")
                .body_contains("name=\"grouping\"")
                .body_contains("[{\"files\":[0]},{\"files\":[1]}]")
                .body_contains("name=\"total_images\"");
            then.status(200).body("Accepted");
        }).await;

        let session = session_with(2);
        let payload = session.build_payload(chrono::Utc::now());
        let response = WebhookTransport::new()
            .send(&server.url("/hook"), &payload)
            .await
            .unwrap();

        hook.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "Accepted");
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start_async().await;
        let hook = server.mock_async(|when, then| {
            when.method(POST).path("/hook");
            then.status(503).body("Scenario paused");
        }).await;

        let session = session_with(1);
        let payload = session.build_payload(chrono::Utc::now());
        let err = WebhookTransport::new()
            .send(&server.url("/hook"), &payload)
            .await
            .unwrap_err();

        hook.assert_async().await;
        match err {
            ReelError::TransportError { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Scenario paused");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_body_keeps_reason() {
        let body = unreadable_body(&"connection reset by peer");
        assert_eq!(body, "<unreadable body: connection reset by peer>");
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_api_error() {
        let session = session_with(1);
        let payload = session.build_payload(chrono::Utc::now());
        let transport = WebhookTransport::with_timeout(Duration::from_secs(2)).unwrap();

        // 沒有服務在監聽的埠
        let err = transport
            .send("http://127.0.0.1:9/hook", &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, ReelError::ApiError(_)));
    }
}
