use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::domain::model::UploadFile;

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
}

impl RegistryInner {
    fn release(&self, id: u64) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&id);
        }
    }
}

/// 預覽控制代碼的發放者，記錄目前仍存活的預覽
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 為檔案建立新的預覽，呼叫端取得獨占所有權
    pub fn acquire(&self, file: &UploadFile) -> PreviewHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut live) = self.inner.live.lock() {
            live.insert(id);
        }
        tracing::trace!("Acquired preview {} for {}", id, file.name);

        PreviewHandle {
            id,
            url: format!("preview://{}/{}", id, file.name),
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn live_count(&self) -> usize {
        self.inner.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, id: u64) -> bool {
        self.inner
            .live
            .lock()
            .map(|live| live.contains(&id))
            .unwrap_or(false)
    }
}

/// 綁定在單一 slot 上的預覽；drop 時自動釋放
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    registry: Weak<RegistryInner>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.release(self.id);
            tracing::trace!("Released preview {}", self.id);
        }
    }
}
