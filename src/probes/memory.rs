//! Memory pressure sampling
//!
//! The host strategy is chosen once at startup; sampling never branches on
//! the platform afterwards.

use crate::errors::{Result, WatchdogError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use sysinfo::System;
use tokio::process::Command;

const PROC_MEMINFO: &str = "/proc/meminfo";

/// Source of the current memory utilization percentage
#[async_trait]
pub trait MemoryProbe: Send + Sync {
    /// Used memory as a percentage of total, 0..=100
    async fn usage_percent(&self) -> Result<f64>;
}

/// How memory utilization is computed on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryStrategy {
    /// `MemTotal`/`MemAvailable` from a meminfo file
    ProcMeminfo { path: PathBuf },
    /// Free, inactive and speculative page counts from `vm_stat`
    VmStat,
    /// Totals reported by sysinfo
    Sysinfo,
}

impl MemoryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MemoryStrategy::ProcMeminfo { .. } => "meminfo",
            MemoryStrategy::VmStat => "vm_stat",
            MemoryStrategy::Sysinfo => "sysinfo",
        }
    }
}

/// Memory probe backed by one host strategy
#[derive(Debug, Clone)]
pub struct HostMemoryProbe {
    strategy: MemoryStrategy,
}

impl HostMemoryProbe {
    /// Probe host capabilities and pick a strategy
    pub fn detect() -> Self {
        let meminfo_usable = std::fs::read_to_string(PROC_MEMINFO)
            .ok()
            .map(|contents| parse_meminfo(&contents).is_ok())
            .unwrap_or(false);

        let strategy = if meminfo_usable {
            MemoryStrategy::ProcMeminfo {
                path: PathBuf::from(PROC_MEMINFO),
            }
        } else if cfg!(target_os = "macos") {
            MemoryStrategy::VmStat
        } else {
            MemoryStrategy::Sysinfo
        };

        Self { strategy }
    }

    pub fn with_strategy(strategy: MemoryStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &MemoryStrategy {
        &self.strategy
    }
}

#[async_trait]
impl MemoryProbe for HostMemoryProbe {
    async fn usage_percent(&self) -> Result<f64> {
        match &self.strategy {
            MemoryStrategy::ProcMeminfo { path } => {
                let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                    WatchdogError::ProbeError(format!("Failed to read {}: {}", path.display(), e))
                })?;
                parse_meminfo(&contents)
            }
            MemoryStrategy::VmStat => {
                let output = Command::new("vm_stat")
                    .output()
                    .await
                    .map_err(|e| WatchdogError::ProbeError(format!("Failed to run vm_stat: {}", e)))?;
                if !output.status.success() {
                    return Err(WatchdogError::ProbeError(format!(
                        "vm_stat exited with {}",
                        output.status
                    )));
                }
                let mut sys = System::new();
                sys.refresh_memory();
                parse_vm_stat(&String::from_utf8_lossy(&output.stdout), sys.total_memory())
            }
            MemoryStrategy::Sysinfo => {
                let mut sys = System::new();
                sys.refresh_memory();
                let total = sys.total_memory();
                if total == 0 {
                    return Err(unknown());
                }
                Ok(sys.used_memory() as f64 / total as f64 * 100.0)
            }
        }
    }
}

fn unknown() -> WatchdogError {
    WatchdogError::ProbeError("Cannot determine memory usage on this system".to_string())
}

/// Utilization from meminfo text: `(1 - MemAvailable / MemTotal) * 100`
pub fn parse_meminfo(contents: &str) -> Result<f64> {
    let values: HashMap<&str, u64> = contents
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim(), value))
        })
        .collect();

    match (values.get("MemTotal"), values.get("MemAvailable")) {
        (Some(&total), Some(&available)) if total > 0 => {
            Ok((1.0 - available as f64 / total as f64) * 100.0)
        }
        _ => Err(unknown()),
    }
}

/// Utilization from `vm_stat` output and the physical memory size in bytes
pub fn parse_vm_stat(output: &str, total_bytes: u64) -> Result<f64> {
    if total_bytes == 0 {
        return Err(unknown());
    }

    let mut page_size: Option<u64> = None;
    let mut pages: HashMap<&str, u64> = HashMap::new();

    for line in output.lines() {
        if let Some(idx) = line.find("page size of ") {
            page_size = leading_number(&line[idx + "page size of ".len()..]);
            continue;
        }
        if let Some((key, rest)) = line.split_once(':') {
            if let Some(count) = leading_number(rest) {
                pages.insert(key.trim(), count);
            }
        }
    }

    let page_size = page_size.ok_or_else(|| {
        WatchdogError::ProbeError("vm_stat output has no page size header".to_string())
    })?;

    let free_like = ["Pages free", "Pages speculative", "Pages inactive"]
        .iter()
        .map(|key| pages.get(key).copied().unwrap_or(0))
        .sum::<u64>();

    let used = total_bytes.saturating_sub(free_like.saturating_mul(page_size));
    Ok(used as f64 / total_bytes as f64 * 100.0)
}

/// First run of digits in `text`, ignoring thousands separators
fn leading_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MEMINFO: &str = "MemTotal:       16000000 kB\n\
                           MemFree:         1000000 kB\n\
                           MemAvailable:    4000000 kB\n\
                           Buffers:          200000 kB\n";

    const VM_STAT: &str = "Mach Virtual Memory Statistics: (page size of 16384 bytes)\n\
                           Pages free:                               10000.\n\
                           Pages active:                            200000.\n\
                           Pages inactive:                           20000.\n\
                           Pages speculative:                        10,000.\n\
                           Pages wired down:                         90000.\n";

    #[test]
    fn test_parse_meminfo() {
        let pct = parse_meminfo(MEMINFO).unwrap();
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_meminfo_missing_available() {
        assert!(parse_meminfo("MemTotal: 100 kB\n").is_err());
        assert!(parse_meminfo("garbage").is_err());
    }

    #[test]
    fn test_parse_vm_stat() {
        // 40000 free-like pages * 16 KiB = 655_360_000 bytes
        let total = 16384 * 400_000u64;
        let pct = parse_vm_stat(VM_STAT, total).unwrap();
        assert!((pct - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_vm_stat_clamps_at_zero() {
        let pct = parse_vm_stat(VM_STAT, 1024).unwrap();
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_parse_vm_stat_requires_page_size() {
        assert!(parse_vm_stat("Pages free: 10.\n", 1024).is_err());
        assert!(parse_vm_stat(VM_STAT, 0).is_err());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("   1,234,567."), Some(1_234_567));
        assert_eq!(leading_number("none"), None);
    }

    #[tokio::test]
    async fn test_meminfo_strategy_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MEMINFO.as_bytes()).unwrap();

        let probe = HostMemoryProbe::with_strategy(MemoryStrategy::ProcMeminfo {
            path: file.path().to_path_buf(),
        });
        let pct = probe.usage_percent().await.unwrap();
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_meminfo_strategy_missing_file() {
        let probe = HostMemoryProbe::with_strategy(MemoryStrategy::ProcMeminfo {
            path: PathBuf::from("/nonexistent/meminfo"),
        });
        let err = probe.usage_percent().await.unwrap_err();
        assert!(matches!(err, WatchdogError::ProbeError(_)));
    }

    #[test]
    fn test_detect_picks_a_strategy() {
        let probe = HostMemoryProbe::detect();
        assert!(!probe.strategy().name().is_empty());
    }
}
