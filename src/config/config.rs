use crate::fitness::alphabet::{AMINO_ACIDS, GB1_WILD_TYPE};
use crate::ngs::{CountWindow, MergeLayout};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeConfig {
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    #[serde(default = "default_wild_type")]
    pub wild_type: String,
}

fn default_alphabet() -> String {
    AMINO_ACIDS.to_string()
}

fn default_wild_type() -> String {
    GB1_WILD_TYPE.to_string()
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            wild_type: default_wild_type(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeLayout,
    #[serde(default)]
    pub count: CountWindow,
    #[serde(default)]
    pub landscape: LandscapeConfig,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "landscape", "landscape-tools")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the user configuration, falling back to defaults when absent or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => return config,
                    Err(e) => warn!("Ignoring config {}: {:#}", config_path.display(), e),
                }
            }
        }
        Config::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.merge.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path wins over the user configuration.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
