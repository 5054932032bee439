//! Error types for the model watchdog
//!
//! Configuration errors are fatal at startup. Every other kind is caught by
//! the supervision loop or the recovery orchestrator and turned into a log
//! line or an operator notification.

use thiserror::Error;

/// Main error type for the watchdog
#[derive(Error, Debug)]
pub enum WatchdogError {
    /// Malformed configuration or empty workload inventory
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Memory or health sampling failed
    #[error("Probe error: {0}")]
    ProbeError(String),

    /// Switch command exited non-zero
    #[error("switch command failed rc={exit_code}, stderr={stderr}")]
    SwitchError { exit_code: i32, stderr: String },

    /// Restart command exited non-zero
    #[error("restart command failed rc={exit_code}, stderr={stderr}")]
    RestartError { exit_code: i32, stderr: String },

    /// Emergency fallback command or its restart failed
    #[error("emergency fallback failed: {0}")]
    FallbackError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl WatchdogError {
    /// Whether this failure left the managed service without a running workload
    pub fn is_restart_failure(&self) -> bool {
        matches!(self, WatchdogError::RestartError { .. })
    }
}

/// Result type alias for watchdog operations
pub type Result<T> = std::result::Result<T, WatchdogError>;
