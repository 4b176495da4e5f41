//! JSON API.
//!
//! - `mobile`      : page-load tracking and mobile statistics
//! - `performance` : health, quick performance test, mobile readiness

pub mod mobile;
pub mod performance;
