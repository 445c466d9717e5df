use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_GENERATION_URL: &str = "http://127.0.0.1:8000/generate";
pub const DEFAULT_HISTORY_URL: &str = "http://localhost:8000/history";

const ENV_GENERATION_URL: &str = "KONTEN_GENERATION_URL";
const ENV_HISTORY_URL: &str = "KONTEN_HISTORY_URL";
const ENV_EXPORT_DIR: &str = "KONTEN_EXPORT_DIR";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub generation_url: String,
    pub history_url: String,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation_url: DEFAULT_GENERATION_URL.to_string(),
            history_url: DEFAULT_HISTORY_URL.to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file if one is given, then
    /// `KONTEN_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        log::debug!("Reading config from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse config TOML")
    }

    // Empty values are ignored so an unset-but-exported variable is harmless
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_GENERATION_URL) {
            self.generation_url = url;
        }
        if let Some(url) = get(ENV_HISTORY_URL) {
            self.history_url = url;
        }
        if let Some(dir) = get(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(dir);
        }
    }
}
