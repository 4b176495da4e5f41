//! perfwatch gateway library entry.
//!
//! Wires config, the composition root, probe collaborators, JSON API,
//! operational endpoints and observability into one axum service. Consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod probes;
pub mod router;
