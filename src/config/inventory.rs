//! Validated workload inventory
//!
//! Built once from the configuration document and never mutated. The mode
//! (flat model list or profiles) is fixed here for the lifetime of a run.

use crate::config::types::{ModelEntry, WatchdogConfig};
use crate::errors::{Result, WatchdogError};

/// One selectable workload
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    pub ram_gb: Option<f64>,
}

/// A named group of models switched together
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSpec {
    pub name: String,
    pub models: Vec<String>,
    pub ram_gb: Option<f64>,
}

/// Which list drives recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryMode {
    Model,
    Profile,
}

/// Immutable model and profile lists plus the selected mode
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    models: Vec<ModelSpec>,
    profiles: Vec<ProfileSpec>,
    mode: InventoryMode,
    initial_profile_index: usize,
}

impl Inventory {
    /// Parse and validate the inventory from a configuration
    pub fn from_config(config: &WatchdogConfig) -> Result<Self> {
        if config.models.is_empty() && config.profiles.is_empty() {
            return Err(WatchdogError::ConfigError(
                "config.models must not be empty".to_string(),
            ));
        }

        let models = parse_models(&config.models)?;
        let profiles = parse_profiles(config, &models)?;

        let mode = if profiles.is_empty() {
            InventoryMode::Model
        } else {
            InventoryMode::Profile
        };

        let initial_profile_index = config
            .initial_profile
            .as_deref()
            .and_then(|wanted| profiles.iter().position(|p| p.name == wanted))
            .unwrap_or(0);

        Ok(Self {
            models,
            profiles,
            mode,
            initial_profile_index,
        })
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn profiles(&self) -> &[ProfileSpec] {
        &self.profiles
    }

    pub fn mode(&self) -> InventoryMode {
        self.mode
    }

    /// Starting profile index (configured `initial_profile` or 0)
    pub fn initial_profile_index(&self) -> usize {
        self.initial_profile_index
    }

    /// Length of the list that drives decisions in the current mode
    pub fn active_len(&self) -> usize {
        match self.mode {
            InventoryMode::Model => self.models.len(),
            InventoryMode::Profile => self.profiles.len(),
        }
    }

    /// Name of the entry at `index` in the active list
    pub fn active_name(&self, index: usize) -> Option<&str> {
        match self.mode {
            InventoryMode::Model => self.models.get(index).map(|m| m.name.as_str()),
            InventoryMode::Profile => self.profiles.get(index).map(|p| p.name.as_str()),
        }
    }

    /// Declared footprint of the entry at `index` in the active list
    pub fn active_ram_gb(&self, index: usize) -> Option<f64> {
        match self.mode {
            InventoryMode::Model => self.models.get(index).and_then(|m| m.ram_gb),
            InventoryMode::Profile => self.profiles.get(index).and_then(|p| p.ram_gb),
        }
    }
}

fn parse_models(entries: &[ModelEntry]) -> Result<Vec<ModelSpec>> {
    entries
        .iter()
        .map(|entry| match entry {
            ModelEntry::Name(name) if !name.is_empty() => Ok(ModelSpec {
                name: name.clone(),
                ram_gb: None,
            }),
            ModelEntry::Detailed {
                name: Some(name),
                ram_gb,
            } if !name.is_empty() => Ok(ModelSpec {
                name: name.clone(),
                ram_gb: *ram_gb,
            }),
            _ => Err(WatchdogError::ConfigError(
                "each model object requires name".to_string(),
            )),
        })
        .collect()
}

fn parse_profiles(config: &WatchdogConfig, models: &[ModelSpec]) -> Result<Vec<ProfileSpec>> {
    let mut parsed = Vec::with_capacity(config.profiles.len());

    for entry in &config.profiles {
        let name = entry.name.clone().filter(|n| !n.is_empty());
        let members = entry.models.clone().filter(|m| !m.is_empty());
        let (name, members) = match (name, members) {
            (Some(name), Some(members)) => (name, members),
            _ => {
                return Err(WatchdogError::ConfigError(
                    "each profile requires name and non-empty models".to_string(),
                ))
            }
        };

        let ram_gb = entry.ram_gb.or_else(|| derive_profile_ram(&members, models));
        parsed.push(ProfileSpec {
            name,
            models: members,
            ram_gb,
        });
    }

    Ok(parsed)
}

/// Sum of known member footprints; unknown when no member declares one
fn derive_profile_ram(members: &[String], models: &[ModelSpec]) -> Option<f64> {
    let known: Vec<f64> = members
        .iter()
        .filter_map(|member| {
            models
                .iter()
                .find(|m| &m.name == member && m.ram_gb.is_some())
                .and_then(|m| m.ram_gb)
        })
        .collect();

    if known.is_empty() {
        None
    } else {
        Some(known.iter().sum())
    }
}
