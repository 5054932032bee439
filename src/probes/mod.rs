//! Read-only system probes consumed by the supervision loop

pub mod health;
pub mod memory;

pub use health::{HealthProber, HealthStatus};
pub use memory::{parse_meminfo, parse_vm_stat, HostMemoryProbe, MemoryProbe, MemoryStrategy};
