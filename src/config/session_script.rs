use crate::config::env::{normalize_endpoint, WebhookSettings};
use crate::core::layout::Layout;
use crate::core::session::{Action, Session};
use crate::domain::model::{Face, Listing, ListingField, SlotCoord};
use crate::domain::ports::PhotoSource;
use crate::utils::error::{ErrorCategory, ReelError, Result};
use crate::utils::validation::{validate_file_extensions, Validate, IMAGE_EXTENSIONS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 以 TOML 描述的一次編輯流程：版面、物件資訊與依序執行的操作
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub listing: Listing,
    #[serde(default)]
    pub actions: Vec<ScriptAction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub done_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub layout: LayoutSpec,
}

/// `layout = "premium"` 或 `layout = { kind = "freeform", slots = 6 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutSpec {
    Named(String),
    Detailed(Layout),
}

impl Default for LayoutSpec {
    fn default() -> Self {
        LayoutSpec::Detailed(Layout::default())
    }
}

impl LayoutSpec {
    pub fn to_layout(&self) -> Result<Layout> {
        match self {
            LayoutSpec::Named(name) => name.parse(),
            LayoutSpec::Detailed(layout) => Ok(*layout),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    /// 一次選取多張照片並放到指定位置
    Drop {
        files: Vec<String>,
        #[serde(default)]
        group: usize,
        #[serde(default)]
        slot: usize,
        #[serde(default)]
        face: Face,
    },
    Swap {
        from: SlotCoord,
        to: SlotCoord,
    },
    Clear {
        #[serde(default)]
        group: usize,
        #[serde(default)]
        slot: usize,
        #[serde(default)]
        face: Face,
    },
    /// 群組以目前集合中的位置指定
    Merge {
        source: usize,
        target: usize,
    },
    Split {
        group: usize,
    },
    Field {
        field: ListingField,
        value: String,
    },
    Extra {
        value: String,
    },
    RemoveExtra {
        index: usize,
    },
    SelectLayout {
        layout: LayoutSpec,
    },
}

impl ScriptAction {
    /// 轉成 session 操作；照片在此讀入，群組位置在此對應到識別碼
    pub async fn resolve<P: PhotoSource>(&self, session: &Session, photos: &P) -> Result<Action> {
        let action = match self {
            ScriptAction::Drop {
                files,
                group,
                slot,
                face,
            } => {
                let mut loaded = Vec::with_capacity(files.len());
                for file in files {
                    loaded.push(photos.load(file).await?);
                }
                Action::Drop {
                    files: loaded,
                    start: SlotCoord::new(*group, *slot),
                    face: *face,
                }
            }
            ScriptAction::Swap { from, to } => Action::Swap {
                from: *from,
                to: *to,
            },
            ScriptAction::Clear { group, slot, face } => Action::Clear {
                at: SlotCoord::new(*group, *slot),
                face: *face,
            },
            ScriptAction::Merge { source, target } => Action::Merge {
                source: session.group_at(*source)?,
                target: session.group_at(*target)?,
            },
            ScriptAction::Split { group } => Action::Split {
                group: session.group_at(*group)?,
            },
            ScriptAction::Field { field, value } => Action::SetField {
                field: *field,
                value: value.clone(),
            },
            ScriptAction::Extra { value } => Action::PushExtra(value.clone()),
            ScriptAction::RemoveExtra { index } => Action::RemoveExtra(*index),
            ScriptAction::SelectLayout { layout } => Action::SelectLayout(layout.to_layout()?),
        };
        Ok(action)
    }
}

/// 被拒絕的步驟（驗證錯誤不中斷流程，狀態保持不變）
#[derive(Debug)]
pub struct RejectedStep {
    pub step: usize,
    pub error: ReelError,
}

#[derive(Debug)]
pub struct ScriptOutcome {
    pub session: Session,
    pub rejected: Vec<RejectedStep>,
}

impl SessionScript {
    /// 從 TOML 檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析，先替換環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ReelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 ${VAR_NAME}；找不到的變數保留原樣
    pub fn substitute_env_vars(content: &str) -> Result<String> {
        Self::substitute_with(content, |name| std::env::var(name).ok())
    }

    pub fn substitute_with<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReelError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn layout(&self) -> Result<Layout> {
        self.session.layout.to_layout()
    }

    /// 疊加設定檔中的 webhook 值
    pub fn webhook_settings(&self, base: WebhookSettings) -> WebhookSettings {
        let mut settings = base.override_endpoint(self.webhook.endpoint.as_deref());
        if let Some(timeout) = self.webhook.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(delay) = self.webhook.done_delay_ms {
            settings.done_delay_ms = delay;
        }
        settings
    }

    pub fn photo_paths(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                ScriptAction::Drop { files, .. } => Some(files.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// 建立 session 並依序套用所有操作
    pub async fn play<P: PhotoSource>(&self, photos: &P) -> Result<ScriptOutcome> {
        let mut session = Session::new(self.layout()?)?;

        for field in ListingField::ALL {
            let value = self.listing.field(field);
            if !value.is_empty() {
                session.set_field(field, value);
            }
        }
        for extra in &self.listing.extras {
            session.push_extra(extra);
        }

        let mut rejected = Vec::new();
        for (idx, script_action) in self.actions.iter().enumerate() {
            let step = idx + 1;
            let result = match script_action.resolve(&session, photos).await {
                Ok(action) => session.apply(action),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => tracing::debug!("Step {} applied: {:?}", step, script_action),
                Err(error) if error.category() == ErrorCategory::Validation => {
                    tracing::warn!("⚠️ Step {} rejected: {}", step, error);
                    rejected.push(RejectedStep { step, error });
                }
                Err(error) => {
                    tracing::error!("❌ Step {} failed: {}", step, error);
                    return Err(error);
                }
            }
        }

        Ok(ScriptOutcome { session, rejected })
    }
}

impl Validate for SessionScript {
    fn validate(&self) -> Result<()> {
        self.layout()?.validate()?;

        if let Some(endpoint) = normalize_endpoint(self.webhook.endpoint.as_deref()) {
            crate::utils::validation::validate_url("webhook.endpoint", &endpoint)?;
        }
        if let Some(timeout) = self.webhook.timeout_seconds {
            crate::utils::validation::validate_range("webhook.timeout_seconds", timeout, 1, 600)?;
        }

        validate_file_extensions("actions.files", &self.photo_paths(), IMAGE_EXTENSIONS)?;

        for action in &self.actions {
            match action {
                ScriptAction::Drop { files, .. } if files.is_empty() => {
                    return Err(ReelError::ConfigValidationError {
                        field: "actions.files".to_string(),
                        message: "A drop action needs at least one file".to_string(),
                    });
                }
                ScriptAction::SelectLayout { layout } => layout.to_layout()?.validate()?,
                _ => {}
            }
        }

        tracing::debug!("✅ Session script validation passed");
        Ok(())
    }
}
