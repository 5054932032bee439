//! Supervision loop
//!
//! One cooperative loop: sample memory, check health, trigger recovery, sleep.
//! Probe and recovery failures are logged and never end the loop.

use crate::config::{Inventory, InventoryMode, WatchdogConfig};
use crate::errors::Result;
use crate::exec::{
    Clock, CommandRunner, DryRunHttp, DryRunRunner, HttpClient, ReqwestClient, SystemClock,
    SystemRunner,
};
use crate::probes::{HealthProber, HealthStatus, HostMemoryProbe, MemoryProbe};
use crate::recovery::{ControllerState, Notifier, RecoveryOrchestrator, RecoveryOutcome, TriggerReason};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything the watchdog uses to reach the outside world
#[derive(Clone)]
pub struct Capabilities {
    pub runner: Arc<dyn CommandRunner>,
    pub http: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
    pub memory: Arc<dyn MemoryProbe>,
}

impl Capabilities {
    /// Host implementations; `dry_run` replaces commands and webhook posts
    /// with logged no-ops
    pub fn system(dry_run: bool) -> Self {
        let memory = HostMemoryProbe::detect();
        info!("memory probe strategy: {}", memory.strategy().name());

        let reqwest: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new());
        let (runner, http): (Arc<dyn CommandRunner>, Arc<dyn HttpClient>) = if dry_run {
            (Arc::new(DryRunRunner::new()), Arc::new(DryRunHttp::new(reqwest)))
        } else {
            (Arc::new(SystemRunner::new()), reqwest)
        };

        Self {
            runner,
            http,
            clock: Arc::new(SystemClock),
            memory: Arc::new(memory),
        }
    }
}

/// What one loop iteration observed and did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// `None` when the memory probe failed this cycle
    pub memory_percent: Option<f64>,
    pub health: HealthStatus,
    pub recoveries: Vec<(TriggerReason, RecoveryOutcome)>,
}

/// Owns the controller state and drives probes and recovery
pub struct Supervisor {
    interval: Duration,
    memory_threshold_percent: f64,
    health_fail_limit: u32,
    memory: Arc<dyn MemoryProbe>,
    health: HealthProber,
    orchestrator: RecoveryOrchestrator,
    state: ControllerState,
    clock: Arc<dyn Clock>,
}

impl Supervisor {
    /// Build the watchdog; fails only on an invalid inventory
    pub fn new(config: &WatchdogConfig, caps: Capabilities) -> Result<Self> {
        let inventory = Inventory::from_config(config)?;
        let state = ControllerState::new(&inventory);

        if inventory.mode() == InventoryMode::Profile {
            info!(
                "profile mode enabled, start profile={}",
                inventory.active_name(state.current_profile_index).unwrap_or_default()
            );
        }

        let notifier = Notifier::new(
            config.notification.clone(),
            caps.runner.clone(),
            caps.http.clone(),
        );
        let health = HealthProber::new(
            config.health_check.clone(),
            caps.runner.clone(),
            caps.http.clone(),
        );
        let orchestrator =
            RecoveryOrchestrator::new(config, inventory, caps.runner, notifier, caps.clock.clone());

        Ok(Self {
            interval: config.interval(),
            memory_threshold_percent: config.memory_threshold_percent,
            health_fail_limit: config.consecutive_health_fail_limit,
            memory: caps.memory,
            health,
            orchestrator,
            state,
            clock: caps.clock,
        })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn orchestrator(&self) -> &RecoveryOrchestrator {
        &self.orchestrator
    }

    /// Run one iteration without sleeping
    pub async fn tick(&mut self) -> TickReport {
        let mut recoveries = Vec::new();

        let memory_percent = match self.memory.usage_percent().await {
            Ok(percent) => {
                info!("memory usage={:.2}%", percent);
                Some(percent)
            }
            Err(e) => {
                warn!("memory monitor error: {}", e);
                None
            }
        };

        if let Some(percent) = memory_percent {
            if percent >= self.memory_threshold_percent {
                let outcome = self
                    .orchestrator
                    .recover(&mut self.state, TriggerReason::MemoryOverload, Some(percent))
                    .await;
                recoveries.push((TriggerReason::MemoryOverload, outcome));
            }
        }

        let health = self.health.check().await;
        if health.is_healthy() {
            self.state.health_fail_count = 0;
        } else {
            self.state.health_fail_count += 1;
            info!("health fail count={}", self.state.health_fail_count);

            if self.state.health_fail_count >= self.health_fail_limit {
                let outcome = self
                    .orchestrator
                    .recover(&mut self.state, TriggerReason::HealthCheckFailed, None)
                    .await;
                recoveries.push((TriggerReason::HealthCheckFailed, outcome));
                self.state.health_fail_count = 0;
            }
        }

        TickReport {
            memory_percent,
            health,
            recoveries,
        }
    }

    /// Loop forever, one tick per interval
    pub async fn run(&mut self) {
        info!("watchdog started");
        loop {
            self.tick().await;
            self.clock.sleep(self.interval).await;
        }
    }
}
