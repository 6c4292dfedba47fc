use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::preview::{PreviewHandle, PreviewRegistry};
use crate::utils::error::{ReelError, Result};

/// 一個群組最多容納的 slot 數量（keyframe pair）
pub const MAX_GROUP_SLOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// 在同一個 session 內發放不重複的 slot / group 識別碼
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_slot: u64,
    next_group: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_slot(&mut self) -> SlotId {
        let id = SlotId(self.next_slot);
        self.next_slot += 1;
        id
    }

    pub fn next_group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }
}

/// 使用者選取的照片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            content_type,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// slot 的一面；雙圖模式下每個 slot 有 primary 與 secondary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    #[default]
    Primary,
    Secondary,
}

/// 檔案與其預覽永遠一起存在或一起消失
#[derive(Debug)]
struct Attachment {
    file: UploadFile,
    preview: PreviewHandle,
}

#[derive(Debug)]
pub struct Slot {
    id: SlotId,
    primary: Option<Attachment>,
    secondary: Option<Attachment>,
}

impl Slot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            primary: None,
            secondary: None,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    fn face(&self, face: Face) -> &Option<Attachment> {
        match face {
            Face::Primary => &self.primary,
            Face::Secondary => &self.secondary,
        }
    }

    fn face_mut(&mut self, face: Face) -> &mut Option<Attachment> {
        match face {
            Face::Primary => &mut self.primary,
            Face::Secondary => &mut self.secondary,
        }
    }

    pub fn file(&self, face: Face) -> Option<&UploadFile> {
        self.face(face).as_ref().map(|a| &a.file)
    }

    pub fn preview(&self, face: Face) -> Option<&PreviewHandle> {
        self.face(face).as_ref().map(|a| &a.preview)
    }

    pub fn primary_file(&self) -> Option<&UploadFile> {
        self.file(Face::Primary)
    }

    pub fn secondary_file(&self) -> Option<&UploadFile> {
        self.file(Face::Secondary)
    }

    pub fn is_vacant(&self, face: Face) -> bool {
        self.face(face).is_none()
    }

    pub fn is_occupied(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// 依 primary、secondary 順序列出已指派的檔案
    pub fn files(&self) -> impl Iterator<Item = &UploadFile> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .map(|a| &a.file)
    }

    /// 只在該面為空時放入檔案；已佔用時把檔案原封不動退回
    pub(crate) fn assign(
        &mut self,
        face: Face,
        file: UploadFile,
        previews: &PreviewRegistry,
    ) -> std::result::Result<(), UploadFile> {
        let cell = self.face_mut(face);
        if cell.is_some() {
            return Err(file);
        }
        let preview = previews.acquire(&file);
        *cell = Some(Attachment { file, preview });
        Ok(())
    }

    /// 替換檔案，舊預覽在此釋放
    pub(crate) fn replace(
        &mut self,
        face: Face,
        file: UploadFile,
        previews: &PreviewRegistry,
    ) -> Option<UploadFile> {
        let preview = previews.acquire(&file);
        self.face_mut(face)
            .replace(Attachment { file, preview })
            .map(|old| old.file)
    }

    pub(crate) fn clear(&mut self, face: Face) -> Option<UploadFile> {
        self.face_mut(face).take().map(|old| old.file)
    }
}

#[derive(Debug)]
pub struct Group {
    pub(crate) id: GroupId,
    pub(crate) slots: Vec<Slot>,
}

impl Group {
    pub fn new(id: GroupId, slots: Vec<Slot>) -> Result<Self> {
        if slots.is_empty() || slots.len() > MAX_GROUP_SLOTS {
            return Err(ReelError::validation(format!(
                "A group holds 1 to {} slots, got {}",
                MAX_GROUP_SLOTS,
                slots.len()
            )));
        }
        Ok(Self { id, slots })
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_pair(&self) -> bool {
        self.slots.len() == MAX_GROUP_SLOTS
    }

    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }
}

/// 以位置定位 slot：第幾個群組中的第幾個 slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotCoord {
    pub group: usize,
    pub slot: usize,
}

impl SlotCoord {
    pub fn new(group: usize, slot: usize) -> Self {
        Self { group, slot }
    }
}

impl fmt::Display for SlotCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingField {
    Title,
    Price,
    Location,
    Size,
    Beds,
    Baths,
}

impl ListingField {
    /// 提交前必須填寫的欄位
    pub const REQUIRED: [ListingField; 3] =
        [ListingField::Title, ListingField::Price, ListingField::Location];

    pub const ALL: [ListingField; 6] = [
        ListingField::Title,
        ListingField::Price,
        ListingField::Location,
        ListingField::Size,
        ListingField::Beds,
        ListingField::Baths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingField::Title => "title",
            ListingField::Price => "price",
            ListingField::Location => "location",
            ListingField::Size => "size",
            ListingField::Beds => "beds",
            ListingField::Baths => "baths",
        }
    }
}

/// 物件資訊
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub location: String,
    pub size: String,
    pub beds: String,
    pub baths: String,
    pub extras: Vec<String>,
}

impl Listing {
    pub fn field(&self, field: ListingField) -> &str {
        match field {
            ListingField::Title => &self.title,
            ListingField::Price => &self.price,
            ListingField::Location => &self.location,
            ListingField::Size => &self.size,
            ListingField::Beds => &self.beds,
            ListingField::Baths => &self.baths,
        }
    }

    pub fn set_field(&mut self, field: ListingField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ListingField::Title => self.title = value,
            ListingField::Price => self.price = value,
            ListingField::Location => self.location = value,
            ListingField::Size => self.size = value,
            ListingField::Beds => self.beds = value,
            ListingField::Baths => self.baths = value,
        }
    }

    /// 新增附加設施；空白輸入會被忽略，重複值允許
    pub fn push_extra(&mut self, extra: &str) -> bool {
        let trimmed = extra.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.extras.push(trimmed.to_string());
        true
    }

    pub fn remove_extra(&mut self, index: usize) -> Option<String> {
        if index < self.extras.len() {
            Some(self.extras.remove(index))
        } else {
            None
        }
    }
}

/// 附加在請求上的一張照片及其序號
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub index: usize,
    pub file: UploadFile,
}

/// manifest 中的一個群組：其已填 slot 的照片序號
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub files: Vec<usize>,
}

/// 送給影片服務的分組描述，序號對應附件順序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub Vec<GroupEntry>);

impl Manifest {
    pub fn groups(&self) -> &[GroupEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 依序攤平所有序號
    pub fn flatten(&self) -> Vec<usize> {
        self.0.iter().flat_map(|g| g.files.iter().copied()).collect()
    }
}

/// 一次提交的完整內容
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub layout: String,
    pub attachments: Vec<IndexedFile>,
    pub manifest: Manifest,
    pub listing: Listing,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_file_guesses_mime() {
        assert_eq!(UploadFile::new("a.jpg", vec![]).content_type, "image/jpeg");
        assert_eq!(UploadFile::new("b.png", vec![]).content_type, "image/png");
        assert_eq!(
            UploadFile::new("c", vec![]).content_type,
            "application/octet-stream"
        );
        assert_eq!(
            UploadFile::new("d", vec![]).with_content_type("image/heic").content_type,
            "image/heic"
        );
    }

    #[test]
    fn test_slot_assign_does_not_overwrite() {
        let previews = PreviewRegistry::new();
        let mut ids = IdAllocator::new();
        let mut slot = Slot::new(ids.next_slot());

        assert!(slot
            .assign(Face::Primary, UploadFile::new("a.jpg", vec![1]), &previews)
            .is_ok());
        let rejected = slot
            .assign(Face::Primary, UploadFile::new("b.jpg", vec![2]), &previews)
            .unwrap_err();
        assert_eq!(rejected.name, "b.jpg");
        assert_eq!(slot.primary_file().unwrap().name, "a.jpg");
        assert_eq!(previews.live_count(), 1);
    }

    #[test]
    fn test_slot_replace_and_clear_release_previews() {
        let previews = PreviewRegistry::new();
        let mut slot = Slot::new(IdAllocator::new().next_slot());

        slot.assign(Face::Primary, UploadFile::new("a.jpg", vec![1]), &previews)
            .unwrap();
        let first_preview = slot.preview(Face::Primary).unwrap().id();

        let old = slot.replace(Face::Primary, UploadFile::new("b.jpg", vec![2]), &previews);
        assert_eq!(old.unwrap().name, "a.jpg");
        assert!(!previews.is_live(first_preview));
        assert_eq!(previews.live_count(), 1);

        assert_eq!(slot.clear(Face::Primary).unwrap().name, "b.jpg");
        assert!(slot.preview(Face::Primary).is_none());
        assert_eq!(previews.live_count(), 0);
        assert!(slot.clear(Face::Primary).is_none());
    }

    #[test]
    fn test_group_size_bounds() {
        let mut ids = IdAllocator::new();
        assert!(Group::new(ids.next_group(), vec![]).is_err());

        let three = (0..3).map(|_| Slot::new(ids.next_slot())).collect();
        assert!(Group::new(ids.next_group(), three).is_err());

        let pair = (0..2).map(|_| Slot::new(ids.next_slot())).collect();
        assert!(Group::new(ids.next_group(), pair).unwrap().is_pair());
    }

    #[test]
    fn test_listing_extras_keep_order_and_duplicates() {
        let mut listing = Listing::default();
        assert!(listing.push_extra("  Bazen "));
        assert!(listing.push_extra("Garaža"));
        assert!(listing.push_extra("Bazen"));
        assert!(!listing.push_extra("   "));
        assert_eq!(listing.extras, vec!["Bazen", "Garaža", "Bazen"]);

        assert_eq!(listing.remove_extra(1).as_deref(), Some("Garaža"));
        assert_eq!(listing.remove_extra(9), None);
        assert_eq!(listing.extras, vec!["Bazen", "Bazen"]);
    }

    #[test]
    fn test_manifest_serializes_as_file_lists() {
        let manifest = Manifest(vec![
            GroupEntry { files: vec![0, 1] },
            GroupEntry { files: vec![2] },
        ]);
        assert_eq!(
            serde_json::to_string(&manifest).unwrap(),
            r#"[{"files":[0,1]},{"files":[2]}]"#
        );
        assert_eq!(manifest.flatten(), vec![0, 1, 2]);
    }
}
