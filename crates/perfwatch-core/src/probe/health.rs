use chrono::{DateTime, Utc};
use serde::Serialize;

use super::round_to;

/// Above this response time (ms) the process is reported `slow`.
pub const SLOW_RESPONSE_MS: f64 = 200.0;
/// Above this response time (ms) the process is reported `critical`.
pub const CRITICAL_RESPONSE_MS: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Slow,
    Critical,
}

impl HealthStatus {
    /// The stricter threshold is checked first so `critical` is reachable.
    pub fn classify(response_ms: f64) -> Self {
        if response_ms > CRITICAL_RESPONSE_MS {
            HealthStatus::Critical
        } else if response_ms > SLOW_RESPONSE_MS {
            HealthStatus::Slow
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Body of `GET /api/performance/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    /// RFC 3339.
    pub timestamp: DateTime<Utc>,
    /// Seconds since the Unix epoch.
    pub server_time: f64,
    pub memory_usage: f64,
    pub cpu_usage: f64,
    pub response_time_ms: f64,
}

impl HealthSnapshot {
    pub fn new(
        taken_at: DateTime<Utc>,
        memory_usage: f64,
        cpu_usage: f64,
        response_ms: f64,
    ) -> Self {
        Self {
            status: HealthStatus::classify(response_ms),
            timestamp: taken_at,
            server_time: taken_at.timestamp_micros() as f64 / 1_000_000.0,
            memory_usage,
            cpu_usage,
            response_time_ms: round_to(response_ms, 2),
        }
    }
}
