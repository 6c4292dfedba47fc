use crate::utils::error::Result;
use crate::utils::validation::{validate_url, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "reel-intake")]
#[command(about = "Arrange listing photos into scenes and submit them to the video webhook")]
pub struct CliConfig {
    /// Path to the session script (TOML)
    #[arg(short, long, default_value = "session.toml")]
    pub script: String,

    /// Webhook endpoint, overrides the script and REEL_WEBHOOK_URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Directory photos are loaded from (defaults to the script's directory)
    #[arg(long)]
    pub photos_dir: Option<String>,

    /// Show the arrangement and manifest without submitting
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    pub fn photos_dir(&self) -> PathBuf {
        match &self.photos_dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.script)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("script", &self.script)?;
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}
