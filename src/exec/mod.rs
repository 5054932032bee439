//! Capability interfaces for everything that touches the outside world
//!
//! The recovery orchestrator and supervision loop only see these traits, so
//! dry-run mode and tests swap implementations instead of branching.

pub mod clock;
pub mod http;
pub mod runner;
pub mod template;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use http::{DryRunHttp, HttpClient, ReqwestClient};
pub use runner::{CommandRunner, DryRunRunner, SystemRunner};
pub use template::{fill_model_template, fill_profile_template, shell_quote};
pub use types::CommandOutput;
