//! In-memory page-load sampler.
//!
//! Keeps a bounded FIFO of the most recent load-time observations reported by
//! clients and derives mobile-only aggregate statistics on demand. The buffer
//! is owned by one `PerformanceSampler` instance; callers share it behind an
//! `Arc` and never see the lock.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::probe::round_to;

/// Number of observations retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 1000;
/// Loads strictly faster than this (seconds) count as good performance.
pub const GOOD_LOAD_SECS: f64 = 1.0;
/// Mobile loads slower than this (seconds) are logged as warnings.
pub const SLOW_MOBILE_LOAD_SECS: f64 = 2.0;
/// Good-load fraction a mobile population must exceed to be labelled `good`.
pub const HEALTHY_GOOD_FRACTION: f64 = 0.75;

/// Client device class as reported by the tracking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Unknown,
}

impl DeviceType {
    /// Exact, case-sensitive match; anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "mobile" => DeviceType::Mobile,
            "desktop" => DeviceType::Desktop,
            _ => DeviceType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Desktop => "desktop",
            DeviceType::Unknown => "unknown",
        }
    }
}

/// One page-load observation.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceEntry {
    pub timestamp: DateTime<Utc>,
    /// Load time in seconds.
    pub load_time: f64,
    pub device_type: DeviceType,
    pub page_url: String,
    pub is_good_performance: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileHealth {
    Good,
    NeedsImprovement,
}

/// Aggregates over the retained mobile entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobileStats {
    pub total_mobile_requests: usize,
    /// Mean load time in seconds, 2 decimals.
    pub average_load_time: f64,
    /// Share of good loads as a 0-100 percentage, 1 decimal.
    pub good_performance_rate: f64,
    pub mobile_health: MobileHealth,
}

/// Result of [`PerformanceSampler::stats`]: either statistics or the
/// `{"status": "no_data"}` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsReport {
    Mobile(MobileStats),
    NoData { status: &'static str },
}

impl StatsReport {
    pub fn no_data() -> Self {
        StatsReport::NoData { status: "no_data" }
    }
}

/// Bounded, thread-safe log of page-load observations.
#[derive(Debug)]
pub struct PerformanceSampler {
    capacity: usize,
    entries: Mutex<VecDeque<PerformanceEntry>>,
}

impl Default for PerformanceSampler {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PerformanceSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    // Push and trim happen under one guard; a poisoned deque still holds <= capacity.
    fn lock(&self) -> MutexGuard<'_, VecDeque<PerformanceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one observation, evicting the oldest entries beyond capacity.
    pub fn track(&self, load_time: f64, device_type: DeviceType, page_url: impl Into<String>) {
        let entry = PerformanceEntry {
            timestamp: Utc::now(),
            load_time,
            device_type,
            page_url: page_url.into(),
            is_good_performance: load_time < GOOD_LOAD_SECS,
        };

        if device_type == DeviceType::Mobile && load_time > SLOW_MOBILE_LOAD_SECS {
            tracing::warn!(load_time, page_url = %entry.page_url, "slow mobile page load");
        }

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Mobile-only statistics, or the no-data sentinel when no mobile entry
    /// is retained.
    pub fn stats(&self) -> StatsReport {
        let (count, total_load, good) = {
            let entries = self.lock();
            entries
                .iter()
                .filter(|e| e.device_type == DeviceType::Mobile)
                .fold((0usize, 0.0f64, 0usize), |(n, sum, good), e| {
                    (n + 1, sum + e.load_time, good + usize::from(e.is_good_performance))
                })
        };

        if count == 0 {
            return StatsReport::no_data();
        }

        let good_fraction = good as f64 / count as f64;
        StatsReport::Mobile(MobileStats {
            total_mobile_requests: count,
            average_load_time: round_to(total_load / count as f64, 2),
            good_performance_rate: round_to(good_fraction * 100.0, 1),
            mobile_health: if good_fraction > HEALTHY_GOOD_FRACTION {
                MobileHealth::Good
            } else {
                MobileHealth::NeedsImprovement
            },
        })
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<PerformanceEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
