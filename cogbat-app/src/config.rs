use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cogbat_experiment::BatteryConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "cogbat.toml";
pub const DEFAULT_DATA_DIR: &str = ".cogbat";

/// Contents of `cogbat.toml`. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub battery: BatteryConfig,
    pub data_dir: Option<PathBuf>,
    /// Base URL of the aggregation endpoint; submission is off without it.
    pub endpoint: Option<String>,
    pub log: Option<String>,
}

impl AppConfig {
    /// Reads `path`, or `cogbat.toml` in the working directory when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&raw).with_context(|| format!("in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid config")?;
        config.battery.validate()?;
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}
