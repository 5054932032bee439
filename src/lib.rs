//! Model watchdog
//!
//! Supervises a long-running model-serving service. Memory pressure and
//! health are sampled on a fixed interval; a breach triggers a graduated
//! recovery (switch workload, restart service, emergency fallback) under a
//! cooldown, with an operator notification for every attempt.
//!
//! # Architecture
//!
//! - **config**: configuration document and immutable workload inventory
//! - **probes**: memory and health sampling
//! - **recovery**: selection policy, orchestrator, notifications
//! - **supervisor**: the supervision loop
//! - **exec**: command, HTTP and clock capabilities (system, dry-run, manual)

pub mod errors;

pub use errors::{Result, WatchdogError};

pub mod cli;
pub mod config;
pub mod exec;
pub mod logging;
pub mod probes;
pub mod recovery;
pub mod supervisor;

pub use config::{Inventory, WatchdogConfig};
pub use supervisor::{Capabilities, Supervisor, TickReport};
