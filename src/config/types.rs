//! Configuration document types
//!
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete watchdog configuration as read from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub models: Vec<ModelEntry>,
    pub profiles: Vec<ProfileEntry>,
    pub initial_profile: Option<String>,
    pub interval_sec: u64,
    pub memory_threshold_percent: f64,
    pub consecutive_health_fail_limit: u32,
    pub cooldown_sec: u64,
    pub log_file: PathBuf,
    pub prefer_lower_memory_on_overload: bool,
    pub health_check: HealthCheckConfig,
    pub notification: NotificationConfig,
    pub switch: SwitchConfig,
    pub restart: RestartConfig,
    pub emergency_fallback: EmergencyFallbackConfig,
}

/// A model entry: either a bare name or an object with an optional footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        ram_gb: Option<f64>,
    },
}

/// A profile entry groups models that are switched together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEntry {
    pub name: Option<String>,
    pub models: Option<Vec<String>>,
    pub ram_gb: Option<f64>,
}

/// Health check configuration; both checks are opt-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub command: Option<Vec<String>>,
    pub url: Option<String>,
    pub method: String,
    pub timeout_sec: u64,
}

/// Operator notification channels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub command: Option<Vec<String>>,
}

/// Command that activates a new model or profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub command: Option<Vec<String>>,
    pub timeout_sec: u64,
}

/// Command that restarts the managed service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub command: Option<Vec<String>>,
    pub timeout_sec: u64,
}

/// Last-resort workload used when a restart leaves nothing running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyFallbackConfig {
    pub enabled: bool,
    pub name: String,
    pub command: Option<Vec<String>>,
    pub timeout_sec: u64,
    pub restart_command: Option<Vec<String>>,
    pub restart_timeout_sec: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            profiles: Vec::new(),
            initial_profile: None,
            interval_sec: 5,
            memory_threshold_percent: 90.0,
            consecutive_health_fail_limit: 3,
            cooldown_sec: 60,
            log_file: PathBuf::from("watchdog.log"),
            prefer_lower_memory_on_overload: true,
            health_check: HealthCheckConfig::default(),
            notification: NotificationConfig::default(),
            switch: SwitchConfig::default(),
            restart: RestartConfig::default(),
            emergency_fallback: EmergencyFallbackConfig::default(),
        }
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            command: None,
            url: None,
            method: "GET".to_string(),
            timeout_sec: 15,
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_sec: 30,
        }
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_sec: 60,
        }
    }
}

impl Default for EmergencyFallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "gemini".to_string(),
            command: None,
            timeout_sec: 30,
            restart_command: None,
            restart_timeout_sec: 60,
        }
    }
}

/// A configured command line, treating an empty list as absent
pub(crate) fn argv(command: &Option<Vec<String>>) -> Option<&[String]> {
    command.as_deref().filter(|c| !c.is_empty())
}

impl WatchdogConfig {
    /// Time between supervision iterations
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_sec)
    }

    /// Minimum time between two recovery attempts
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_sec)
    }
}

impl HealthCheckConfig {
    pub fn argv(&self) -> Option<&[String]> {
        argv(&self.command)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

impl NotificationConfig {
    pub fn argv(&self) -> Option<&[String]> {
        argv(&self.command)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref().filter(|u| !u.is_empty())
    }
}

impl SwitchConfig {
    pub fn argv(&self) -> Option<&[String]> {
        argv(&self.command)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

impl RestartConfig {
    pub fn argv(&self) -> Option<&[String]> {
        argv(&self.command)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

impl EmergencyFallbackConfig {
    pub fn argv(&self) -> Option<&[String]> {
        argv(&self.command)
    }

    pub fn restart_argv(&self) -> Option<&[String]> {
        argv(&self.restart_command)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_secs(self.restart_timeout_sec)
    }
}
