use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::session::Session;
use crate::domain::model::Manifest;
use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::{ReelError, Result};

pub const DEFAULT_DONE_DELAY: Duration = Duration::from_millis(4000);

#[derive(Debug, Default)]
struct SubmitFlags {
    busy: AtomicBool,
    done: AtomicBool,
    generation: AtomicU64,
}

/// 持有期間 busy 為 true，離開任何路徑時自動清除
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a AtomicBool) -> Result<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReelError::SubmissionInFlight)?;
        Ok(Self { busy })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// 成功提交的摘要
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub status: u16,
    pub total_images: usize,
    pub manifest: Manifest,
    pub timestamp: DateTime<Utc>,
}

/// 提交流程：設定檢查 → busy → 驗證 → 組裝 → 傳送。一次只允許一個請求，不重試。
pub struct Submitter<T: Transport> {
    transport: T,
    endpoint: Option<String>,
    done_delay: Duration,
    flags: Arc<SubmitFlags>,
    done_timer: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> Submitter<T> {
    pub fn new(transport: T, endpoint: Option<String>) -> Self {
        Self {
            transport,
            endpoint,
            done_delay: DEFAULT_DONE_DELAY,
            flags: Arc::new(SubmitFlags::default()),
            done_timer: Mutex::new(None),
        }
    }

    pub fn from_config<C: ConfigProvider>(transport: T, config: &C) -> Self {
        Self::new(transport, config.webhook_endpoint().map(str::to_string))
            .with_done_delay(config.done_delay())
    }

    pub fn with_done_delay(mut self, delay: Duration) -> Self {
        self.done_delay = delay;
        self
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.flags.busy.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.flags.done.load(Ordering::Acquire)
    }

    pub async fn submit(&self, session: &Session) -> Result<SubmitReceipt> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ReelError::MissingConfigError {
                field: "webhook.endpoint".to_string(),
            })?;

        let _busy = BusyGuard::acquire(&self.flags.busy)?;

        session.check_submittable()?;

        let payload = session.build_payload(Utc::now());
        tracing::info!(
            "📤 Sending {} photo(s) in {} group(s) with layout '{}'",
            payload.total_images(),
            payload.manifest.len(),
            payload.layout
        );
        tracing::debug!("Grouping: {:?}", payload.manifest);

        let response = self.transport.send(endpoint, &payload).await?;
        tracing::info!("✅ Webhook accepted submission (HTTP {})", response.status);

        self.mark_done();

        Ok(SubmitReceipt {
            status: response.status,
            total_images: payload.total_images(),
            manifest: payload.manifest,
            timestamp: payload.timestamp,
        })
    }

    /// 顯示完成狀態，並排程在 done_delay 後自動清除
    fn mark_done(&self) {
        self.flags.done.store(true, Ordering::Release);
        let generation = self.flags.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let flags = Arc::downgrade(&self.flags);
        let delay = self.done_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // submitter 已釋放時直接忽略
            if let Some(flags) = flags.upgrade() {
                if flags.generation.load(Ordering::Acquire) == generation {
                    flags.done.store(false, Ordering::Release);
                }
            }
        });

        if let Ok(mut timer) = self.done_timer.lock() {
            if let Some(previous) = timer.replace(handle) {
                previous.abort();
            }
        }
    }
}

impl<T: Transport> Drop for Submitter<T> {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.done_timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
