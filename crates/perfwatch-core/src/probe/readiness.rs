//! Mobile readiness: a fixed set of pass/fail checks, a percentage score and
//! one recommendation per failing category.

use serde::Serialize;

use super::{error_text, round_to};
use crate::Result;

/// Handler response time must stay under this (ms).
pub const RESPONSE_TARGET_MS: f64 = 200.0;
/// Count query must finish under this (ms).
pub const DB_TARGET_MS: f64 = 50.0;

pub const RECOMMEND_DATABASE: &str = "Optimize database queries";
pub const RECOMMEND_CACHING: &str = "Implement aggressive caching";
pub const RECOMMEND_STATIC: &str = "Optimize static assets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Partial,
    Optimize,
    Error,
}

/// One readiness check; serialised with a `"check"` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ReadinessCheck {
    ResponseTime {
        value: f64,
        target: &'static str,
        status: CheckStatus,
    },
    StaticOptimization {
        css_bundles: bool,
        js_compression: bool,
        status: CheckStatus,
    },
    DatabasePerformance {
        #[serde(skip_serializing_if = "Option::is_none")]
        time_ms: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<&'static str>,
        status: CheckStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ReadinessCheck {
    pub fn response_time(ms: f64) -> Self {
        ReadinessCheck::ResponseTime {
            value: round_to(ms, 2),
            target: "< 200ms",
            status: if ms < RESPONSE_TARGET_MS {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
        }
    }

    /// `css_bundles`: optimized asset directory exists.
    /// `js_compression`: critical mobile script exists.
    pub fn static_optimization(css_bundles: bool, js_compression: bool) -> Self {
        ReadinessCheck::StaticOptimization {
            css_bundles,
            js_compression,
            status: if css_bundles && js_compression {
                CheckStatus::Pass
            } else {
                CheckStatus::Partial
            },
        }
    }

    pub fn database(outcome: Result<f64>) -> Self {
        match outcome {
            Ok(ms) => ReadinessCheck::DatabasePerformance {
                time_ms: Some(round_to(ms, 2)),
                target: Some("< 50ms"),
                status: if ms < DB_TARGET_MS {
                    CheckStatus::Pass
                } else {
                    CheckStatus::Optimize
                },
                error: None,
            },
            Err(e) => ReadinessCheck::DatabasePerformance {
                time_ms: None,
                target: None,
                status: CheckStatus::Error,
                error: Some(error_text(&e)),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReadinessCheck::ResponseTime { .. } => "response_time",
            ReadinessCheck::StaticOptimization { .. } => "static_optimization",
            ReadinessCheck::DatabasePerformance { .. } => "database_performance",
        }
    }

    pub fn status(&self) -> CheckStatus {
        match self {
            ReadinessCheck::ResponseTime { status, .. }
            | ReadinessCheck::StaticOptimization { status, .. }
            | ReadinessCheck::DatabasePerformance { status, .. } => *status,
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == CheckStatus::Pass
    }

    /// Advice for this check, or `None` when it passed.
    pub fn recommendation(&self) -> Option<&'static str> {
        if self.passed() {
            return None;
        }
        Some(match self {
            ReadinessCheck::ResponseTime { .. } => RECOMMEND_CACHING,
            ReadinessCheck::StaticOptimization { .. } => RECOMMEND_STATIC,
            ReadinessCheck::DatabasePerformance { .. } => RECOMMEND_DATABASE,
        })
    }

    /// Measured duration, for checks that time something.
    pub fn time_ms(&self) -> Option<f64> {
        match self {
            ReadinessCheck::ResponseTime { value, .. } => Some(*value),
            ReadinessCheck::StaticOptimization { .. } => None,
            ReadinessCheck::DatabasePerformance { time_ms, .. } => *time_ms,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ReadinessCheck::DatabasePerformance { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

/// Body of `GET /api/performance/mobile-readiness`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub mobile_readiness_score: f64,
    pub total_test_time_ms: f64,
    pub recommendations: Vec<String>,
    pub checks: Vec<ReadinessCheck>,
}

impl ReadinessReport {
    pub fn new(total_ms: f64, checks: Vec<ReadinessCheck>) -> Self {
        let passed = checks.iter().filter(|c| c.passed()).count();
        let score = if checks.is_empty() {
            0.0
        } else {
            round_to(passed as f64 / checks.len() as f64 * 100.0, 1)
        };

        Self {
            mobile_readiness_score: score,
            total_test_time_ms: round_to(total_ms, 2),
            recommendations: recommendations(&checks),
            checks,
        }
    }
}

// Database advice leads, then caching, then static assets.
fn recommendations(checks: &[ReadinessCheck]) -> Vec<String> {
    let order = [RECOMMEND_DATABASE, RECOMMEND_CACHING, RECOMMEND_STATIC];
    let found: Vec<&'static str> =
        checks.iter().filter_map(ReadinessCheck::recommendation).collect();
    order
        .into_iter()
        .filter(|r| found.contains(r))
        .map(String::from)
        .collect()
}
