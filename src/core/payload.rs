use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::model::{Group, GroupEntry, IndexedFile, Listing, Manifest, SubmissionPayload};
use crate::utils::error::Result;

/// 依群組順序、群組內 slot 順序（primary 先於 secondary）攤平已填的照片。
/// 空的 slot 不佔序號；沒有任何照片的群組不出現在 manifest 中。
pub fn flatten(groups: &[Group]) -> (Vec<IndexedFile>, Manifest) {
    let mut attachments = Vec::new();
    let mut entries = Vec::new();

    for group in groups {
        let mut entry = GroupEntry::default();
        for file in group.slots().iter().flat_map(|slot| slot.files()) {
            let index = attachments.len();
            attachments.push(IndexedFile {
                index,
                file: file.clone(),
            });
            entry.files.push(index);
        }
        if !entry.files.is_empty() {
            entries.push(entry);
        }
    }

    (attachments, Manifest(entries))
}

pub fn build_payload(
    layout_id: &str,
    groups: &[Group],
    listing: &Listing,
    timestamp: DateTime<Utc>,
) -> SubmissionPayload {
    let (attachments, manifest) = flatten(groups);
    SubmissionPayload {
        layout: layout_id.to_string(),
        attachments,
        manifest,
        listing: listing.clone(),
        timestamp,
    }
}

impl SubmissionPayload {
    pub fn attachment_field(index: usize) -> String {
        format!("image_{}", index)
    }

    pub fn total_images(&self) -> usize {
        self.attachments.len()
    }

    /// ISO 8601，精確到毫秒
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// multipart 中照片以外的欄位，依送出順序排列
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>> {
        let listing = &self.listing;
        Ok(vec![
            ("layout", self.layout.clone()),
            ("title", listing.title.clone()),
            ("price", listing.price.clone()),
            ("location", listing.location.clone()),
            ("size", listing.size.clone()),
            ("beds", listing.beds.clone()),
            ("baths", listing.baths.clone()),
            ("extras", serde_json::to_string(&listing.extras)?),
            ("grouping", serde_json::to_string(&self.manifest)?),
            ("timestamp", self.timestamp_iso()),
            ("total_images", self.total_images().to_string()),
        ])
    }
}
