use anyhow::Context;
use chrono::NaiveDate;
use epi_dataset::dataset::{default_historical_start, LoadOptions, DEFAULT_MODELS};
use epi_dataset::source::{SourceRoot, DEFAULT_MAX_TRIES, DEFAULT_REQUEST_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from the optional `--config` JSON file. Every field has a
/// default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Models whose predictions and nowcasts are loaded
    pub models: Vec<String>,
    /// First week to look for a historical ground truth snapshot
    pub historical_start: NaiveDate,
    /// Attempts per remote file
    pub fetch_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            historical_start: default_historical_start(),
            fetch_retries: DEFAULT_MAX_TRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Where to read sources from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataLocation {
    Directory(PathBuf),
    Url(String),
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> anyhow::Result<DashboardConfig> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read the config file, or fall back to defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                DashboardConfig::from_json(&json)
                    .with_context(|| format!("failed to parse config {}", path.display()))
            }
            None => Ok(DashboardConfig::default()),
        }
    }

    pub fn load_options(&self, location: &DataLocation, as_of: NaiveDate) -> anyhow::Result<LoadOptions> {
        let root = match location {
            DataLocation::Directory(dir) => SourceRoot::directory(dir.clone()),
            DataLocation::Url(base_url) => SourceRoot::remote(
                base_url,
                self.fetch_retries,
                Duration::from_secs(self.request_timeout_secs),
            )?,
        };
        let mut options = LoadOptions::new(root, as_of);
        options.models = self.models.clone();
        options.historical_start = self.historical_start;
        Ok(options)
    }
}
