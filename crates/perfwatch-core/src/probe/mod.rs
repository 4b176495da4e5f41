//! Probe reports and classification rules.
//!
//! The gateway measures (clock, system counters, database, filesystem); this
//! module turns raw timings and percentages into the status labels and
//! aggregate reports returned to clients. Nothing here performs I/O.
//!
//! - `health`    : process health snapshot
//! - `quick`     : quick performance test (database / resources / filesystem)
//! - `readiness` : mobile readiness score and recommendations

pub mod health;
pub mod quick;
pub mod readiness;

use std::time::Instant;

pub use health::{HealthSnapshot, HealthStatus};
pub use quick::{OverallStatus, ProbeStatus, QuickTest, QuickTestReport};
pub use readiness::{CheckStatus, ReadinessCheck, ReadinessReport};

/// Time reported for a probe that failed before producing a timing.
pub const FAILED_PROBE_MS: f64 = 999.0;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Wall-clock milliseconds since `start`.
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Failure text for an `"error"` entry; never empty.
pub(crate) fn error_text(err: &crate::PerfWatchError) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        "unknown error".to_string()
    } else {
        msg
    }
}
