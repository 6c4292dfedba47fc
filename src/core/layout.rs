use crate::domain::model::{Face, Group, IdAllocator, Slot};
use crate::utils::error::{ReelError, Result};
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_FREEFORM_SLOTS: usize = 5;
pub const MAX_LAYOUT_SLOTS: usize = 32;

const PREMIUM_LABELS: [&str; 7] = ["1A", "1B", "2", "3A", "3B", "4", "5"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// 5 個獨立 slot
    #[default]
    Standard,
    /// 7 個 slot，其中 1A/1B 與 3A/3B 為固定的 keyframe pair
    Premium,
    /// 使用者自行合併/拆分的單 slot 群組
    Freeform {
        slots: usize,
        #[serde(default)]
        min_filled: Option<usize>,
    },
    /// 每個 slot 可放 primary 與 secondary 兩張照片
    Dual {
        slots: usize,
        #[serde(default)]
        min_filled: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    Fixed,
    UserDriven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceMode {
    Single,
    Dual,
}

impl FaceMode {
    pub fn faces(&self) -> &'static [Face] {
        match self {
            FaceMode::Single => &[Face::Primary],
            FaceMode::Dual => &[Face::Primary, Face::Secondary],
        }
    }

    pub fn supports(&self, face: Face) -> bool {
        self.faces().contains(&face)
    }
}

/// 版面對應的初始拓樸與提交門檻
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPolicy {
    pub id: &'static str,
    pub group_sizes: Vec<usize>,
    pub min_filled: usize,
    pub pairing: Pairing,
    pub faces: FaceMode,
    pub labels: &'static [&'static str],
}

impl Layout {
    pub fn freeform(slots: usize) -> Self {
        Layout::Freeform {
            slots,
            min_filled: None,
        }
    }

    pub fn dual(slots: usize) -> Self {
        Layout::Dual {
            slots,
            min_filled: None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Layout::Standard => "standard",
            Layout::Premium => "premium",
            Layout::Freeform { .. } => "freeform",
            Layout::Dual { .. } => "dual",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Layout::Standard | Layout::Premium => Ok(()),
            Layout::Freeform { slots, min_filled } | Layout::Dual { slots, min_filled } => {
                validate_range("session.layout.slots", slots, 1, MAX_LAYOUT_SLOTS)?;
                if let Some(min) = min_filled {
                    validate_range("session.layout.min_filled", min, 1, slots)?;
                }
                Ok(())
            }
        }
    }

    pub fn policy(&self) -> LayoutPolicy {
        match *self {
            Layout::Standard => LayoutPolicy {
                id: self.id(),
                group_sizes: vec![1; 5],
                min_filled: 5,
                pairing: Pairing::Fixed,
                faces: FaceMode::Single,
                labels: &[],
            },
            Layout::Premium => LayoutPolicy {
                id: self.id(),
                group_sizes: vec![2, 1, 2, 1, 1],
                min_filled: 7,
                pairing: Pairing::Fixed,
                faces: FaceMode::Single,
                labels: &PREMIUM_LABELS,
            },
            Layout::Freeform { slots, min_filled } => LayoutPolicy {
                id: self.id(),
                group_sizes: vec![1; slots],
                min_filled: min_filled.unwrap_or(slots),
                pairing: Pairing::UserDriven,
                faces: FaceMode::Single,
                labels: &[],
            },
            Layout::Dual { slots, min_filled } => LayoutPolicy {
                id: self.id(),
                group_sizes: vec![1; slots],
                min_filled: min_filled.unwrap_or(slots),
                pairing: Pairing::Fixed,
                faces: FaceMode::Dual,
                labels: &[],
            },
        }
    }
}

impl FromStr for Layout {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Layout::Standard),
            "premium" => Ok(Layout::Premium),
            "freeform" => Ok(Layout::freeform(DEFAULT_FREEFORM_SLOTS)),
            "dual" => Ok(Layout::dual(DEFAULT_FREEFORM_SLOTS)),
            other => Err(ReelError::InvalidConfigValueError {
                field: "session.layout".to_string(),
                value: other.to_string(),
                reason: "Valid layouts: standard, premium, freeform, dual".to_string(),
            }),
        }
    }
}

impl LayoutPolicy {
    pub fn slot_count(&self) -> usize {
        self.group_sizes.iter().sum()
    }

    /// 依拓樸建立全新的群組集合
    pub fn build_groups(&self, ids: &mut IdAllocator) -> Result<Vec<Group>> {
        self.group_sizes
            .iter()
            .map(|&size| {
                let slots = (0..size).map(|_| Slot::new(ids.next_slot())).collect();
                Group::new(ids.next_group(), slots)
            })
            .collect()
    }

    /// 依攤平後的 slot 序號產生顯示標籤
    pub fn label(&self, flat_index: usize) -> String {
        match self.labels.get(flat_index) {
            Some(label) => label.to_string(),
            None => format!("Foto {}", flat_index + 1),
        }
    }
}
