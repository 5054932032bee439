//! Recovery protocol: target selection, the orchestrator state machine and
//! operator notifications

pub mod notify;
pub mod orchestrator;
pub mod selection;
pub mod types;

pub use notify::Notifier;
pub use orchestrator::RecoveryOrchestrator;
pub use selection::select_target;
pub use types::{ControllerState, Notice, RecoveryOutcome, RecoveryPhase, TriggerReason};
