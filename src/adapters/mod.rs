// Adapters layer: concrete implementations for external systems (local photos, webhook http).

pub mod files;
pub mod http;
