use crate::core::submit::DEFAULT_DONE_DELAY;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, validate_url, Validate};
use std::env;
use std::time::Duration;

pub const ENDPOINT_VAR: &str = "REEL_WEBHOOK_URL";
pub const DONE_DELAY_VAR: &str = "REEL_DONE_DELAY_MS";
pub const TIMEOUT_VAR: &str = "REEL_TIMEOUT_SECONDS";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// webhook 相關設定；endpoint 缺少時仍可建立，提交時才回報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub done_delay_ms: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            done_delay_ms: DEFAULT_DONE_DELAY.as_millis() as u64,
        }
    }
}

/// 空字串或未替換的 ${VAR} 都視為未設定
pub fn normalize_endpoint(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.contains("${") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl WebhookSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            endpoint: normalize_endpoint(lookup(ENDPOINT_VAR).as_deref()),
            timeout_seconds: lookup(TIMEOUT_VAR)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            done_delay_ms: lookup(DONE_DELAY_VAR)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.done_delay_ms),
        }
    }

    /// 以較高優先權的值覆蓋（命令列 > 設定檔 > 環境變數）
    pub fn override_endpoint(mut self, endpoint: Option<&str>) -> Self {
        if let Some(endpoint) = normalize_endpoint(endpoint) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    pub fn has_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }
}

impl ConfigProvider for WebhookSettings {
    fn webhook_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn done_delay(&self) -> Duration {
        Duration::from_millis(self.done_delay_ms)
    }
}

impl Validate for WebhookSettings {
    fn validate(&self) -> Result<()> {
        // endpoint 缺少不算錯誤，格式錯誤才是
        if let Some(endpoint) = &self.endpoint {
            validate_url("webhook.endpoint", endpoint)?;
        }
        validate_range("webhook.timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_range("webhook.done_delay_ms", self.done_delay_ms, 0, 60_000)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let settings = WebhookSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, WebhookSettings::default());
        assert!(!settings.has_endpoint());
        assert_eq!(settings.done_delay(), Duration::from_millis(4000));
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let settings = WebhookSettings::from_lookup(lookup(&[
            (ENDPOINT_VAR, " https://hook.example.com/abc "),
            (TIMEOUT_VAR, "15"),
            (DONE_DELAY_VAR, "not-a-number"),
        ]));
        assert_eq!(settings.webhook_endpoint(), Some("https://hook.example.com/abc"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.done_delay_ms, 4000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_endpoint_normalization_and_override() {
        assert_eq!(normalize_endpoint(Some("  ")), None);
        assert_eq!(normalize_endpoint(Some("${REEL_WEBHOOK_URL}")), None);

        let settings = WebhookSettings::default()
            .override_endpoint(Some("http://a.test"))
            .override_endpoint(None)
            .override_endpoint(Some(""));
        assert_eq!(settings.endpoint.as_deref(), Some("http://a.test"));

        let bad = WebhookSettings::default().override_endpoint(Some("mailto:x@y"));
        assert!(bad.validate().is_err());
    }
}
