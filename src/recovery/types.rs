//! Recovery system type definitions

use crate::config::{Inventory, InventoryMode};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Why a recovery was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// Memory utilization at or above the threshold
    MemoryOverload,

    /// Consecutive health check failures reached the limit
    HealthCheckFailed,
}

impl TriggerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::MemoryOverload => "memory_overload",
            TriggerReason::HealthCheckFailed => "health_check_failed",
        }
    }
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable controller bookkeeping, reset on every process start
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub current_model_index: usize,
    pub current_profile_index: usize,

    /// Time of the last recovery attempt; the epoch means "never"
    pub last_action_ts: DateTime<Utc>,

    pub health_fail_count: u32,
}

impl ControllerState {
    /// Initial state for an inventory
    pub fn new(inventory: &Inventory) -> Self {
        Self {
            current_profile_index: inventory.initial_profile_index(),
            ..Self::default()
        }
    }

    /// Index into the list that drives decisions in `mode`
    pub fn active_index(&self, mode: InventoryMode) -> usize {
        match mode {
            InventoryMode::Model => self.current_model_index,
            InventoryMode::Profile => self.current_profile_index,
        }
    }

    pub(crate) fn set_active_index(&mut self, mode: InventoryMode, index: usize) {
        match mode {
            InventoryMode::Model => self.current_model_index = index,
            InventoryMode::Profile => self.current_profile_index = index,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            current_model_index: 0,
            current_profile_index: 0,
            last_action_ts: DateTime::<Utc>::default(),
            health_fail_count: 0,
        }
    }
}

/// Phases of a single recovery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryPhase {
    Idle,
    CoolingDown,
    Switching,
    Restarting,
    Escalating,
}

impl RecoveryPhase {
    /// Valid transitions:
    /// - Idle        -> CoolingDown | Switching
    /// - CoolingDown -> Idle
    /// - Switching   -> Restarting | Idle (switch failed)
    /// - Restarting  -> Idle | Escalating
    /// - Escalating  -> Idle
    pub fn can_transition(&self, to: RecoveryPhase) -> bool {
        use RecoveryPhase::*;
        matches!(
            (self, to),
            (Idle, CoolingDown)
                | (Idle, Switching)
                | (CoolingDown, Idle)
                | (Switching, Restarting)
                | (Switching, Idle)
                | (Restarting, Idle)
                | (Restarting, Escalating)
                | (Escalating, Idle)
        )
    }
}

/// Result of one `recover` call
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// Skipped because the previous attempt is too recent
    CoolingDown { remaining: Duration },

    /// Switch and restart succeeded
    Completed { from: String, to: String },

    /// Switch or restart failed
    Failed {
        from: String,
        to: String,
        error: String,
        fallback_activated: bool,
    },
}

impl RecoveryOutcome {
    /// Whether the attempt ran (was not skipped by cooldown)
    pub fn attempted(&self) -> bool {
        !matches!(self, RecoveryOutcome::CoolingDown { .. })
    }
}

/// Operator-facing notification
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RecoveryCompleted {
        reason: TriggerReason,
        from: String,
        to: String,
    },
    RecoveryFailed {
        reason: TriggerReason,
        from: String,
        to: String,
        error: String,
    },
    EmergencyActivated {
        label: String,
    },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::RecoveryCompleted { .. } => "[Watchdog] Recovery completed",
            Notice::RecoveryFailed { .. } => "[Watchdog] Recovery failed",
            Notice::EmergencyActivated { .. } => "[Watchdog] Emergency fallback activated",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Notice::RecoveryCompleted { reason, from, to } => {
                format!("reason={}; from={}; to={}", reason, from, to)
            }
            Notice::RecoveryFailed {
                reason,
                from,
                to,
                error,
            } => format!("reason={}; from={}; to={}; error={}", reason, from, to, error),
            Notice::EmergencyActivated { label } => format!(
                "restart failed; switched to emergency fallback ({}).",
                label
            ),
        }
    }

    /// Title and detail on two lines, as delivered to every channel
    pub fn message(&self) -> String {
        format!("{}\n{}", self.title(), self.detail())
    }
}
