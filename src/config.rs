use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pricing::DEFAULT_EXCLUDED_TAGS;

/// Engine configuration for rai-lens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target unit written after every converted amount
    pub unit: String,

    /// Tags whose direct text children are never rewritten
    pub excluded_tags: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            unit: "RAI".to_string(),
            excluded_tags: DEFAULT_EXCLUDED_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the config directory
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        // Return default configuration if no file found
        Ok(EngineConfig::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            self.save_to(&config_path)?;
        }

        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rai-lens").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<()> {
        let config = EngineConfig::default();
        config.save()?;
        Ok(())
    }

    /// Text appended after a converted amount, e.g. `" RAI"`
    pub fn unit_suffix(&self) -> String {
        format!(" {}", self.unit)
    }
}
