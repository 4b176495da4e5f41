//! Quick performance test: three timed sub-probes and an overall verdict.

use serde::Serialize;

use super::{error_text, round_to, FAILED_PROBE_MS};
use crate::Result;

/// Database liveness faster than this (ms) is `good`.
pub const DB_GOOD_MS: f64 = 50.0;
/// Static directory listing faster than this (ms) is `good`.
pub const FS_GOOD_MS: f64 = 100.0;
/// Memory or CPU at or above this percentage is `high`.
pub const RESOURCE_HIGH_PERCENT: f64 = 80.0;
/// Whole test faster than this (ms) is `good` overall.
pub const OVERALL_GOOD_MS: f64 = 200.0;
/// Whole test faster than this (ms) is mobile ready.
pub const MOBILE_READY_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Good,
    Slow,
    High,
    Error,
}

/// One sub-probe result; serialised with a `"test"` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum QuickTest {
    DatabaseConnection {
        time_ms: f64,
        status: ProbeStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    SystemResources {
        time_ms: f64,
        memory_percent: f64,
        cpu_percent: f64,
        status: ProbeStatus,
    },
    FilesystemAccess {
        time_ms: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        static_files_count: Option<usize>,
        status: ProbeStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl QuickTest {
    /// `outcome` is the query time in ms, or the failure.
    pub fn database(outcome: Result<f64>) -> Self {
        match outcome {
            Ok(ms) => QuickTest::DatabaseConnection {
                time_ms: round_to(ms, 2),
                status: if ms < DB_GOOD_MS {
                    ProbeStatus::Good
                } else {
                    ProbeStatus::Slow
                },
                error: None,
            },
            Err(e) => QuickTest::DatabaseConnection {
                time_ms: FAILED_PROBE_MS,
                status: ProbeStatus::Error,
                error: Some(error_text(&e)),
            },
        }
    }

    pub fn system_resources(time_ms: f64, memory_percent: f64, cpu_percent: f64) -> Self {
        let status =
            if memory_percent < RESOURCE_HIGH_PERCENT && cpu_percent < RESOURCE_HIGH_PERCENT {
                ProbeStatus::Good
            } else {
                ProbeStatus::High
            };
        QuickTest::SystemResources {
            time_ms: round_to(time_ms, 2),
            memory_percent,
            cpu_percent,
            status,
        }
    }

    /// `outcome` is `(listing time in ms, entry count)`, or the failure.
    pub fn filesystem(outcome: Result<(f64, usize)>) -> Self {
        match outcome {
            Ok((ms, count)) => QuickTest::FilesystemAccess {
                time_ms: round_to(ms, 2),
                static_files_count: Some(count),
                status: if ms < FS_GOOD_MS {
                    ProbeStatus::Good
                } else {
                    ProbeStatus::Slow
                },
                error: None,
            },
            Err(e) => QuickTest::FilesystemAccess {
                time_ms: FAILED_PROBE_MS,
                static_files_count: None,
                status: ProbeStatus::Error,
                error: Some(error_text(&e)),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuickTest::DatabaseConnection { .. } => "database_connection",
            QuickTest::SystemResources { .. } => "system_resources",
            QuickTest::FilesystemAccess { .. } => "filesystem_access",
        }
    }

    pub fn status(&self) -> ProbeStatus {
        match self {
            QuickTest::DatabaseConnection { status, .. }
            | QuickTest::SystemResources { status, .. }
            | QuickTest::FilesystemAccess { status, .. } => *status,
        }
    }

    pub fn time_ms(&self) -> f64 {
        match self {
            QuickTest::DatabaseConnection { time_ms, .. }
            | QuickTest::SystemResources { time_ms, .. }
            | QuickTest::FilesystemAccess { time_ms, .. } => *time_ms,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QuickTest::DatabaseConnection { error, .. }
            | QuickTest::FilesystemAccess { error, .. } => error.as_deref(),
            QuickTest::SystemResources { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Good,
    NeedsOptimization,
}

/// Body of `GET /api/performance/quick-test`.
#[derive(Debug, Clone, Serialize)]
pub struct QuickTestReport {
    pub total_time_ms: f64,
    pub overall_status: OverallStatus,
    pub tests: Vec<QuickTest>,
    pub mobile_ready: bool,
}

impl QuickTestReport {
    pub fn new(total_ms: f64, tests: Vec<QuickTest>) -> Self {
        Self {
            total_time_ms: round_to(total_ms, 2),
            overall_status: if total_ms < OVERALL_GOOD_MS {
                OverallStatus::Good
            } else {
                OverallStatus::NeedsOptimization
            },
            tests,
            mobile_ready: total_ms < MOBILE_READY_MS,
        }
    }
}
