use chrono::{DateTime, Utc};

use crate::core::distributor::{self, DistributionReport};
use crate::core::gate;
use crate::core::grouping;
use crate::core::layout::{Layout, LayoutPolicy, Pairing};
use crate::core::payload;
use crate::domain::model::{
    Face, Group, GroupId, IdAllocator, Listing, ListingField, Slot, SlotCoord,
    SubmissionPayload, UploadFile,
};
use crate::domain::preview::PreviewRegistry;
use crate::utils::error::{ReelError, Result};

/// 使用者操作；每個操作要嘛完整套用，要嘛回傳錯誤且狀態不變
#[derive(Debug, Clone)]
pub enum Action {
    SelectLayout(Layout),
    Drop {
        files: Vec<UploadFile>,
        start: SlotCoord,
        face: Face,
    },
    Swap {
        from: SlotCoord,
        to: SlotCoord,
    },
    Clear {
        at: SlotCoord,
        face: Face,
    },
    Replace {
        at: SlotCoord,
        face: Face,
        file: UploadFile,
    },
    Merge {
        source: GroupId,
        target: GroupId,
    },
    Split {
        group: GroupId,
    },
    SetField {
        field: ListingField,
        value: String,
    },
    PushExtra(String),
    RemoveExtra(usize),
}

/// 一次編輯工作階段：版面、群組集合、物件資訊與預覽
#[derive(Debug)]
pub struct Session {
    layout: Layout,
    policy: LayoutPolicy,
    groups: Vec<Group>,
    listing: Listing,
    previews: PreviewRegistry,
    ids: IdAllocator,
}

impl Session {
    pub fn new(layout: Layout) -> Result<Self> {
        Self::with_previews(layout, PreviewRegistry::new())
    }

    pub fn with_previews(layout: Layout, previews: PreviewRegistry) -> Result<Self> {
        layout.validate()?;
        let policy = layout.policy();
        let mut ids = IdAllocator::new();
        let groups = policy.build_groups(&mut ids)?;

        tracing::debug!(
            "New session with layout '{}' ({} slots)",
            policy.id,
            policy.slot_count()
        );

        Ok(Self {
            layout,
            policy,
            groups,
            listing: Listing::default(),
            previews,
            ids,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn policy(&self) -> &LayoutPolicy {
        &self.policy
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id()).collect()
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn slot(&self, at: SlotCoord) -> Option<&Slot> {
        self.groups.get(at.group)?.slots().get(at.slot)
    }

    /// 群組在目前集合中的位置
    pub fn group_at(&self, position: usize) -> Result<GroupId> {
        self.groups
            .get(position)
            .map(|g| g.id())
            .ok_or_else(|| ReelError::UnknownGroup {
                group: format!("#{}", position),
            })
    }

    pub fn filled_count(&self) -> usize {
        gate::filled_count(&self.groups)
    }

    /// 依目前順序列出所有 slot 的位置
    pub fn coords(&self) -> Vec<SlotCoord> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| (0..group.len()).map(move |s| SlotCoord::new(g, s)))
            .collect()
    }

    pub fn label(&self, at: SlotCoord) -> Option<String> {
        self.slot(at)?;
        let flat_index = self.groups[..at.group]
            .iter()
            .map(|g| g.len())
            .sum::<usize>()
            + at.slot;
        Some(self.policy.label(flat_index))
    }

    /// 位於 keyframe pair 中的 slot
    pub fn is_keyframe(&self, at: SlotCoord) -> bool {
        self.slot(at).is_some() && self.groups[at.group].is_pair()
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::SelectLayout(layout) => self.select_layout(layout),
            Action::Drop { files, start, face } => self.distribute(files, start, face).map(|_| ()),
            Action::Swap { from, to } => self.swap(from, to),
            Action::Clear { at, face } => self.clear(at, face).map(|_| ()),
            Action::Replace { at, face, file } => self.replace(at, face, file).map(|_| ()),
            Action::Merge { source, target } => self.merge(source, target),
            Action::Split { group } => self.split(group).map(|_| ()),
            Action::SetField { field, value } => {
                self.set_field(field, value);
                Ok(())
            }
            Action::PushExtra(extra) => {
                self.push_extra(&extra);
                Ok(())
            }
            Action::RemoveExtra(index) => {
                self.remove_extra(index);
                Ok(())
            }
        }
    }

    /// 切換版面：丟棄所有照片（預覽隨之釋放）並重建群組。
    /// 拓樸與門檻都相同的版面視為同一版面，不會重設。
    pub fn select_layout(&mut self, layout: Layout) -> Result<()> {
        layout.validate()?;
        let policy = layout.policy();
        if policy == self.policy {
            self.layout = layout;
            return Ok(());
        }
        let groups = policy.build_groups(&mut self.ids)?;

        let discarded = self.filled_count();
        self.groups = groups;
        self.policy = policy;
        self.layout = layout;

        tracing::info!(
            "Switched layout to '{}' ({} photo(s) discarded)",
            self.policy.id,
            discarded
        );
        Ok(())
    }

    pub fn distribute(
        &mut self,
        files: Vec<UploadFile>,
        start: SlotCoord,
        face: Face,
    ) -> Result<DistributionReport> {
        let report = distributor::distribute(
            &mut self.groups,
            files,
            start,
            face,
            self.policy.faces,
            &self.previews,
        )?;
        tracing::info!(
            "Placed {} photo(s) starting at {}, {} discarded",
            report.placed.len(),
            start,
            report.discarded
        );
        Ok(report)
    }

    pub fn swap(&mut self, from: SlotCoord, to: SlotCoord) -> Result<()> {
        distributor::swap(&mut self.groups, from, to).map(|_| ())
    }

    fn slot_mut(&mut self, at: SlotCoord, face: Face) -> Result<&mut Slot> {
        distributor::check_coord(&self.groups, at)?;
        if !self.policy.faces.supports(face) {
            return Err(ReelError::validation(
                "Secondary images are only available in the dual layout",
            ));
        }
        Ok(&mut self.groups[at.group].slots[at.slot])
    }

    pub fn clear(&mut self, at: SlotCoord, face: Face) -> Result<Option<UploadFile>> {
        let removed = self.slot_mut(at, face)?.clear(face);
        if let Some(file) = &removed {
            tracing::debug!("Cleared {} from slot {}", file.name, at);
        }
        Ok(removed)
    }

    pub fn replace(&mut self, at: SlotCoord, face: Face, file: UploadFile) -> Result<Option<UploadFile>> {
        let previews = self.previews.clone();
        Ok(self.slot_mut(at, face)?.replace(face, file, &previews))
    }

    fn ensure_user_pairing(&self) -> Result<()> {
        match self.policy.pairing {
            Pairing::UserDriven => Ok(()),
            Pairing::Fixed => Err(ReelError::LayoutLocked {
                layout: self.policy.id.to_string(),
            }),
        }
    }

    pub fn merge(&mut self, source: GroupId, target: GroupId) -> Result<()> {
        self.ensure_user_pairing()?;
        grouping::merge(&mut self.groups, source, target).map(|_| ())
    }

    pub fn split(&mut self, group: GroupId) -> Result<Vec<GroupId>> {
        self.ensure_user_pairing()?;
        grouping::split(&mut self.groups, group, &mut self.ids)
    }

    pub fn set_field(&mut self, field: ListingField, value: impl Into<String>) {
        self.listing.set_field(field, value);
    }

    pub fn push_extra(&mut self, extra: &str) -> bool {
        self.listing.push_extra(extra)
    }

    pub fn remove_extra(&mut self, index: usize) -> Option<String> {
        self.listing.remove_extra(index)
    }

    pub fn check_submittable(&self) -> Result<()> {
        gate::can_submit(&self.groups, &self.listing, &self.policy)
    }

    pub fn build_payload(&self, timestamp: DateTime<Utc>) -> SubmissionPayload {
        payload::build_payload(self.policy.id, &self.groups, &self.listing, timestamp)
    }
}
