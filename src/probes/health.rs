//! Health verification of the managed service
//!
//! Two opt-in checks: an external command and an HTTP request. Both must pass
//! when configured. With neither configured the service is always healthy.

use crate::config::HealthCheckConfig;
use crate::exec::{CommandRunner, HttpClient};
use std::sync::Arc;
use tracing::warn;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Runs the configured health checks
pub struct HealthProber {
    config: HealthCheckConfig,
    runner: Arc<dyn CommandRunner>,
    http: Arc<dyn HttpClient>,
}

impl HealthProber {
    pub fn new(
        config: HealthCheckConfig,
        runner: Arc<dyn CommandRunner>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            runner,
            http,
        }
    }

    /// Run the command check, then the URL check
    pub async fn check(&self) -> HealthStatus {
        if let Some(argv) = self.config.argv() {
            let out = self.runner.run(argv, self.config.timeout()).await;
            if !out.success() {
                let cause = format!(
                    "health command failed rc={}, stderr={}",
                    out.exit_code,
                    out.stderr_trimmed()
                );
                warn!("{}", cause);
                return HealthStatus::Unhealthy(cause);
            }
        }

        if let Some(url) = self.config.url() {
            match self
                .http
                .status(&self.config.method, url, self.config.timeout())
                .await
            {
                Ok(code) if code >= 400 => {
                    let cause = format!("health url failed status={}", code);
                    warn!("{}", cause);
                    return HealthStatus::Unhealthy(cause);
                }
                Ok(_) => {}
                Err(e) => {
                    let cause = format!("health url exception: {}", e);
                    warn!("{}", cause);
                    return HealthStatus::Unhealthy(cause);
                }
            }
        }

        HealthStatus::Healthy
    }
}
