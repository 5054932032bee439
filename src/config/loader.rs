//! Loading and validating the configuration document
//!
//! JSON is the native format. Files with a `.toml` extension are accepted as
//! well and parsed into the same document.

use crate::config::types::{ModelEntry, WatchdogConfig};
use crate::errors::{Result, WatchdogError};
use std::collections::HashSet;
use std::path::Path;

impl WatchdogConfig {
    /// Load configuration from a file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WatchdogError::ConfigError(format!("Failed to read config: {}", e)))?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let config = if is_toml {
            Self::from_toml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document without validating it
    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| WatchdogError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Parse a TOML document without validating it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| WatchdogError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Build from an already-loaded JSON structure
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: WatchdogConfig = serde_json::from_value(value)
            .map_err(|e| WatchdogError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() && self.profiles.is_empty() {
            return Err(WatchdogError::ConfigError(
                "config.models must not be empty".to_string(),
            ));
        }

        if self.interval_sec == 0 {
            return Err(WatchdogError::ConfigError(
                "interval_sec must be greater than 0".to_string(),
            ));
        }

        if !self.memory_threshold_percent.is_finite() || self.memory_threshold_percent <= 0.0 {
            return Err(WatchdogError::ConfigError(format!(
                "memory_threshold_percent must be a positive number, got {}",
                self.memory_threshold_percent
            )));
        }

        let mut model_names = HashSet::new();
        for entry in &self.models {
            let (name, ram_gb) = match entry {
                ModelEntry::Name(name) => (Some(name.as_str()), None),
                ModelEntry::Detailed { name, ram_gb } => (name.as_deref(), *ram_gb),
            };
            let name = name
                .filter(|n| !n.is_empty())
                .ok_or_else(|| WatchdogError::ConfigError("each model object requires name".to_string()))?;
            check_ram(name, ram_gb)?;
            if !model_names.insert(name) {
                return Err(WatchdogError::ConfigError(format!(
                    "duplicate model name: {}",
                    name
                )));
            }
        }

        let mut profile_names = HashSet::new();
        for entry in &self.profiles {
            let name = entry.name.as_deref().filter(|n| !n.is_empty());
            let has_models = entry.models.as_ref().map(|m| !m.is_empty()).unwrap_or(false);
            let name = match name {
                Some(name) if has_models => name,
                _ => {
                    return Err(WatchdogError::ConfigError(
                        "each profile requires name and non-empty models".to_string(),
                    ))
                }
            };
            check_ram(name, entry.ram_gb)?;
            if !profile_names.insert(name) {
                return Err(WatchdogError::ConfigError(format!(
                    "duplicate profile name: {}",
                    name
                )));
            }
        }

        Ok(())
    }
}

fn check_ram(name: &str, ram_gb: Option<f64>) -> Result<()> {
    match ram_gb {
        Some(ram) if !ram.is_finite() || ram < 0.0 => Err(WatchdogError::ConfigError(format!(
            "ram_gb for {} must be a non-negative number, got {}",
            name, ram
        ))),
        _ => Ok(()),
    }
}
