use crate::domain::model::{SubmissionPayload, UploadFile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 照片來源（本機資料夾、測試用記憶體等）
pub trait PhotoSource: Send + Sync {
    fn load(&self, path: &str) -> impl std::future::Future<Output = Result<UploadFile>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn webhook_endpoint(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn done_delay(&self) -> Duration;
}

/// 影片服務回應；成功時 body 不做解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, endpoint: &str, payload: &SubmissionPayload) -> Result<TransportResponse>;
}
