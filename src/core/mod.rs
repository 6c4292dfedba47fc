pub mod distributor;
pub mod gate;
pub mod grouping;
pub mod layout;
pub mod payload;
pub mod session;
pub mod submit;

pub use crate::domain::model::{
    Face, Group, GroupId, Listing, ListingField, Manifest, Slot, SlotCoord, SubmissionPayload,
    UploadFile,
};
pub use crate::domain::ports::{ConfigProvider, PhotoSource, Transport, TransportResponse};
pub use crate::utils::error::Result;
