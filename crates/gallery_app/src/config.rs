use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use gallery_engine::ArchiveSettings;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "archive.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gallery root URL; year folders hang directly under it.
    pub base_url: String,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub log_destination: LogDestination,
}

pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let content = fs::read_to_string(path).with_context(|| {
        format!("cannot read config {path:?}; create it with base_url and output_dir")
    })?;
    ron::from_str(&content).with_context(|| format!("malformed config {path:?}"))
}

impl AppConfig {
    pub fn archive_settings(&self) -> anyhow::Result<ArchiveSettings> {
        let base_url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url {:?}", self.base_url))?;
        Ok(ArchiveSettings {
            base_url,
            output_dir: self.output_dir.clone(),
        })
    }
}
