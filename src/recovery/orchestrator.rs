//! Recovery orchestrator
//!
//! Runs one graduated recovery attempt per call:
//! switch -> restart -> (restart failed) emergency fallback -> notify.
//!
//! The cooldown window is the only re-entrancy guard. The supervision loop is
//! single-threaded and awaits each attempt to completion, so attempts never
//! overlap.

use crate::config::{
    EmergencyFallbackConfig, Inventory, InventoryMode, RestartConfig, SwitchConfig, WatchdogConfig,
};
use crate::errors::{Result, WatchdogError};
use crate::exec::{fill_model_template, fill_profile_template, Clock, CommandRunner};
use crate::recovery::notify::Notifier;
use crate::recovery::selection::select_target;
use crate::recovery::types::{
    ControllerState, Notice, RecoveryOutcome, RecoveryPhase, TriggerReason,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Recovery state machine over an immutable inventory
pub struct RecoveryOrchestrator {
    inventory: Inventory,
    prefer_lower_memory: bool,
    cooldown: Duration,
    switch: SwitchConfig,
    restart: RestartConfig,
    fallback: EmergencyFallbackConfig,
    runner: Arc<dyn CommandRunner>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    phase: RecoveryPhase,
}

impl RecoveryOrchestrator {
    pub fn new(
        config: &WatchdogConfig,
        inventory: Inventory,
        runner: Arc<dyn CommandRunner>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inventory,
            prefer_lower_memory: config.prefer_lower_memory_on_overload,
            cooldown: config.cooldown(),
            switch: config.switch.clone(),
            restart: config.restart.clone(),
            fallback: config.emergency_fallback.clone(),
            runner,
            notifier,
            clock,
            phase: RecoveryPhase::Idle,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn phase(&self) -> RecoveryPhase {
        self.phase
    }

    fn enter(&mut self, next: RecoveryPhase) {
        if !self.phase.can_transition(next) {
            warn!("unexpected recovery phase change {:?} -> {:?}", self.phase, next);
        }
        debug!("[STATE] {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Time left before another attempt is allowed, if any
    pub fn cooldown_remaining(&self, state: &ControllerState) -> Option<Duration> {
        // A clock that moved backwards keeps the window open
        match (self.clock.now() - state.last_action_ts).to_std() {
            Ok(elapsed) if elapsed >= self.cooldown => None,
            Ok(elapsed) => Some(self.cooldown - elapsed),
            Err(_) => Some(self.cooldown),
        }
    }

    /// Run one recovery attempt unless the cooldown window is still open
    pub async fn recover(
        &mut self,
        state: &mut ControllerState,
        reason: TriggerReason,
        measured_percent: Option<f64>,
    ) -> RecoveryOutcome {
        if let Some(remaining) = self.cooldown_remaining(state) {
            self.enter(RecoveryPhase::CoolingDown);
            info!(
                "in cooldown ({}s), skip recovery. reason={}",
                self.cooldown.as_secs(),
                reason
            );
            self.enter(RecoveryPhase::Idle);
            return RecoveryOutcome::CoolingDown { remaining };
        }

        let mode = self.inventory.mode();
        let from = self.active_name(state);
        let mut before = match mode {
            InventoryMode::Model => format!("model={}", from),
            InventoryMode::Profile => format!("profile={}", from),
        };
        if let Some(percent) = measured_percent {
            before.push_str(&format!(", memory={:.2}%", percent));
        }
        info!("recovery start: {}, {}", reason, before);

        let result = self.switch_and_restart(state, reason).await;
        // A failed switch leaves the previous workload in place
        let to = match &result {
            Err(WatchdogError::SwitchError { .. }) => from.clone(),
            _ => self.active_name(state),
        };

        let outcome = match result {
            Ok(()) => {
                self.enter(RecoveryPhase::Idle);
                RecoveryOutcome::Completed {
                    from: from.clone(),
                    to: to.clone(),
                }
            }
            Err(err) => {
                let error = err.to_string();
                warn!("recovery error: {}", error);

                let mut fallback_activated = false;
                if err.is_restart_failure() {
                    self.enter(RecoveryPhase::Escalating);
                    match self.activate_emergency_fallback("restart_failed").await {
                        Ok(true) => {
                            fallback_activated = true;
                            self.notifier
                                .notify(&Notice::EmergencyActivated {
                                    label: self.fallback.name.clone(),
                                })
                                .await;
                        }
                        Ok(false) => {}
                        Err(e) => warn!("{}", e),
                    }
                }
                self.enter(RecoveryPhase::Idle);

                RecoveryOutcome::Failed {
                    from: from.clone(),
                    to: to.clone(),
                    error,
                    fallback_activated,
                }
            }
        };

        state.last_action_ts = self.clock.now();

        let notice = match &outcome {
            RecoveryOutcome::Failed { error, .. } => Notice::RecoveryFailed {
                reason,
                from,
                to,
                error: error.clone(),
            },
            _ => Notice::RecoveryCompleted { reason, from, to },
        };
        self.notifier.notify(&notice).await;

        outcome
    }

    async fn switch_and_restart(
        &mut self,
        state: &mut ControllerState,
        reason: TriggerReason,
    ) -> Result<()> {
        self.enter(RecoveryPhase::Switching);
        match self.inventory.mode() {
            InventoryMode::Model => self.switch_model(state, reason).await?,
            InventoryMode::Profile => self.switch_profile(state, reason).await?,
        };

        self.enter(RecoveryPhase::Restarting);
        self.restart_service().await
    }

    fn active_name(&self, state: &ControllerState) -> String {
        let index = state.active_index(self.inventory.mode());
        self.inventory
            .active_name(index)
            .unwrap_or_default()
            .to_string()
    }

    /// Move to the next model and run the switch command for it
    pub async fn switch_model(
        &self,
        state: &mut ControllerState,
        reason: TriggerReason,
    ) -> Result<String> {
        let index = select_target(&self.inventory, state, reason, self.prefer_lower_memory);
        state.set_active_index(InventoryMode::Model, index);
        let target = self.inventory.models()[index].name.clone();

        if let Some(argv) = self.switch.argv() {
            let formatted = fill_model_template(argv, Some(&target), None);
            let out = self.runner.run(&formatted, self.switch.timeout()).await;
            if !out.success() {
                return Err(WatchdogError::SwitchError {
                    exit_code: out.exit_code,
                    stderr: out.stderr_trimmed().to_string(),
                });
            }
        }

        info!("switched model -> {}", target);
        Ok(target)
    }

    /// Move to the next profile and run the switch command for it
    pub async fn switch_profile(
        &self,
        state: &mut ControllerState,
        reason: TriggerReason,
    ) -> Result<String> {
        let index = select_target(&self.inventory, state, reason, self.prefer_lower_memory);
        state.set_active_index(InventoryMode::Profile, index);
        let target = &self.inventory.profiles()[index];

        if let Some(argv) = self.switch.argv() {
            let formatted = fill_profile_template(argv, target);
            let out = self.runner.run(&formatted, self.switch.timeout()).await;
            if !out.success() {
                return Err(WatchdogError::SwitchError {
                    exit_code: out.exit_code,
                    stderr: out.stderr_trimmed().to_string(),
                });
            }
        }

        info!(
            "switched profile -> {} models={}",
            target.name,
            target.models.join(",")
        );
        Ok(target.name.clone())
    }

    /// Restart the managed service; a no-op when no command is configured
    pub async fn restart_service(&self) -> Result<()> {
        let argv = match self.restart.argv() {
            Some(argv) => argv,
            None => {
                info!("restart.command is empty, skip restart");
                return Ok(());
            }
        };

        let out = self.runner.run(argv, self.restart.timeout()).await;
        if !out.success() {
            return Err(WatchdogError::RestartError {
                exit_code: out.exit_code,
                stderr: out.stderr_trimmed().to_string(),
            });
        }

        info!("service restart completed");
        Ok(())
    }

    /// Bring up the emergency workload.
    ///
    /// Returns `Ok(false)` when the fallback is disabled or has no command,
    /// `Ok(true)` once both the command and its optional restart succeeded.
    pub async fn activate_emergency_fallback(&self, reason: &str) -> Result<bool> {
        if !self.fallback.enabled {
            return Ok(false);
        }

        let label = &self.fallback.name;
        let argv = match self.fallback.argv() {
            Some(argv) => argv,
            None => {
                info!("emergency_fallback.command is empty, skip fallback");
                return Ok(false);
            }
        };

        info!("emergency fallback start -> {} ({})", label, reason);
        let out = self.runner.run(argv, self.fallback.timeout()).await;
        if !out.success() {
            return Err(WatchdogError::FallbackError(format!(
                "command failed rc={}, stderr={}",
                out.exit_code,
                out.stderr_trimmed()
            )));
        }

        if let Some(restart) = self.fallback.restart_argv() {
            let out = self.runner.run(restart, self.fallback.restart_timeout()).await;
            if !out.success() {
                return Err(WatchdogError::FallbackError(format!(
                    "restart failed rc={}, stderr={}",
                    out.exit_code,
                    out.stderr_trimmed()
                )));
            }
        }

        info!("emergency fallback activated -> {}", label);
        Ok(true)
    }
}
