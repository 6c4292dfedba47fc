pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{files::LocalPhotoSource, http::WebhookTransport};
pub use config::{SessionScript, WebhookSettings};
pub use core::{
    layout::Layout,
    session::{Action, Session},
    submit::{SubmitReceipt, Submitter},
};
pub use domain::model::{Face, GroupId, Listing, ListingField, SlotCoord, UploadFile};
pub use utils::error::{ReelError, Result};
