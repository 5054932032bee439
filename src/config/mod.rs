//! Configuration management for the watchdog
//!
//! Handles the on-disk document, its validation, and the immutable workload
//! inventory derived from it.

pub mod inventory;
pub mod loader;
pub mod types;

pub use inventory::{Inventory, InventoryMode, ModelSpec, ProfileSpec};
pub use types::{
    EmergencyFallbackConfig, HealthCheckConfig, ModelEntry, NotificationConfig, ProfileEntry,
    RestartConfig, SwitchConfig, WatchdogConfig,
};
