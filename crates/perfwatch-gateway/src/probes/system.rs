use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use perfwatch_core::probe::round_to;

/// Utilisation percentages, one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSample {
    pub memory_percent: f64,
    pub cpu_percent: f64,
}

impl SystemSample {
    pub fn new(memory_percent: f64, cpu_percent: f64) -> Self {
        Self {
            memory_percent: round_to(memory_percent, 1),
            cpu_percent: round_to(cpu_percent, 1),
        }
    }
}

#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// Read memory utilisation and CPU utilisation averaged over `cpu_window`.
    async fn sample(&self, cpu_window: Duration) -> SystemSample;
}

/// sysinfo ignores a CPU refresh issued sooner than
/// `MINIMUM_CPU_UPDATE_INTERVAL` after the previous one, so shorter windows
/// are stretched to that interval.
pub fn effective_cpu_window(requested: Duration) -> Duration {
    requested.max(MINIMUM_CPU_UPDATE_INTERVAL)
}

/// Host counters via `sysinfo`.
#[derive(Debug, Default)]
pub struct SysinfoProbe;

impl SysinfoProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemProbe for SysinfoProbe {
    async fn sample(&self, cpu_window: Duration) -> SystemSample {
        let mut sys = System::new();
        sys.refresh_memory();

        // CPU usage is a delta between two refreshes.
        sys.refresh_cpu_usage();
        tokio::time::sleep(effective_cpu_window(cpu_window)).await;
        sys.refresh_cpu_usage();

        let total = sys.total_memory();
        let memory = if total > 0 {
            sys.used_memory() as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        SystemSample::new(memory, sys.global_cpu_usage() as f64)
    }
}
