//! perfwatch core: transport-agnostic monitoring primitives and error types.
//!
//! This crate holds the page-load sampler, the probe report types and the
//! rules that classify probe timings. It carries no HTTP or runtime
//! dependencies; the gateway performs all I/O and feeds measurements in.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A poisoned sampler lock is recovered instead of taking the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod probe;
pub mod sampler;

/// Shared result type.
pub use error::{PerfWatchError, Result};
pub use sampler::{DeviceType, MobileStats, PerformanceEntry, PerformanceSampler, StatsReport};
