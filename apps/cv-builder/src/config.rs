use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::credential::FileCredentialStore;
use crate::export::PageFormat;

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Loopback port for the form/preview surface.
    pub port: u16,
    pub rust_log: String,
    pub export_dir: PathBuf,
    pub page_format: PageFormat,
    pub credential_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5173".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            export_dir: std::env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("exports")),
            page_format: std::env::var("EXPORT_PAGE_FORMAT")
                .unwrap_or_else(|_| "a4".to_string())
                .parse::<PageFormat>()
                .map_err(|e| anyhow!(e))
                .context("EXPORT_PAGE_FORMAT is invalid")?,
            credential_path: credential_path()?,
        })
    }
}

fn credential_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CREDENTIAL_PATH") {
        return Ok(PathBuf::from(path));
    }
    FileCredentialStore::default_path()
        .context("No config directory on this platform; set CREDENTIAL_PATH")
}
