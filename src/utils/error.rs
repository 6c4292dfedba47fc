use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Not enough photos: {filled} of {required} required slots are filled")]
    InsufficientPhotos { filled: usize, required: usize },

    #[error("Required listing field '{field}' is empty")]
    MissingListingField { field: String },

    #[error("Cannot merge group {source_group} into {target_group}: {combined} slots exceed the limit of {limit}")]
    GroupCapacityExceeded {
        source_group: String,
        target_group: String,
        combined: usize,
        limit: usize,
    },

    #[error("Layout '{layout}' has a fixed topology; groups cannot be merged or split")]
    LayoutLocked { layout: String },

    #[error("Unknown group: {group}")]
    UnknownGroup { group: String },

    #[error("No slot at group {group}, slot {slot}")]
    InvalidPosition { group: usize, slot: usize },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Webhook failed with status {status}: {body}")]
    TransportError { status: u16, body: String },
}

/// 錯誤分類，對應提交流程中的失敗來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Transport,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReelError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReelError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReelError::ConfigError { .. }
            | ReelError::MissingConfigError { .. }
            | ReelError::InvalidConfigValueError { .. }
            | ReelError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReelError::InsufficientPhotos { .. }
            | ReelError::MissingListingField { .. }
            | ReelError::GroupCapacityExceeded { .. }
            | ReelError::LayoutLocked { .. }
            | ReelError::UnknownGroup { .. }
            | ReelError::InvalidPosition { .. }
            | ReelError::ValidationError { .. }
            | ReelError::SubmissionInFlight => ErrorCategory::Validation,
            ReelError::ApiError(_) | ReelError::TransportError { .. } => ErrorCategory::Transport,
            ReelError::IoError(_) | ReelError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否可以由使用者手動重新提交
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReelError::ApiError(_) | ReelError::TransportError { .. } | ReelError::SubmissionInFlight
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReelError::MissingConfigError { field } => {
                format!("缺少必要設定: {}", field)
            }
            ReelError::InsufficientPhotos { filled, required } => {
                format!("請上傳 {} 張照片（目前 {} 張）並填寫必填欄位", required, filled)
            }
            ReelError::MissingListingField { field } => {
                format!("必填欄位 '{}' 不能為空", field)
            }
            ReelError::GroupCapacityExceeded { limit, .. } => {
                format!("每個群組最多只能有 {} 張照片", limit)
            }
            ReelError::TransportError { status, .. } => {
                format!("Webhook 回應失敗 (HTTP {})", status)
            }
            ReelError::ApiError(e) => format!("網路連線失敗: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReelError::MissingConfigError { .. } => {
                "Set REEL_WEBHOOK_URL or pass --endpoint before submitting"
            }
            ReelError::InvalidConfigValueError { .. } | ReelError::ConfigValidationError { .. } => {
                "Check the session script against the documented format"
            }
            ReelError::ConfigError { .. } => "Review the configuration values",
            ReelError::InsufficientPhotos { .. } => "Add photos to the empty slots and try again",
            ReelError::MissingListingField { .. } => "Fill in title, price and location",
            ReelError::GroupCapacityExceeded { .. } => "Split one of the groups before merging",
            ReelError::LayoutLocked { .. } => "Switch to the freeform layout to regroup photos",
            ReelError::UnknownGroup { .. } | ReelError::InvalidPosition { .. } => {
                "Refer to a slot that exists in the current layout"
            }
            ReelError::ValidationError { .. } => "Correct the input and try again",
            ReelError::SubmissionInFlight => "Wait for the current submission to finish",
            ReelError::ApiError(_) | ReelError::TransportError { .. } => {
                "Check the webhook endpoint and submit again"
            }
            ReelError::IoError(_) => "Check that the photo files exist and are readable",
            ReelError::SerializationError(_) => "Report this as a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReelError>;
