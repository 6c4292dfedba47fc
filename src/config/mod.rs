#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod session_script;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use env::WebhookSettings;
pub use session_script::{ScriptAction, SessionScript};
