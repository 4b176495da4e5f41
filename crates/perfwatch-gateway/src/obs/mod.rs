//! In-process observability.
//!
//! - `metrics` : counters and latency histograms rendered by `/metrics`
//! - `timing`  : per-request timing middleware with mobile detection

pub mod metrics;
pub mod timing;

pub use metrics::GatewayMetrics;
