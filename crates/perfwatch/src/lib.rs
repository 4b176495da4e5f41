//! Top-level facade crate for perfwatch.
//!
//! Re-exports the domain core and the HTTP gateway so users can depend on a single crate.

pub mod core {
    pub use perfwatch_core::*;
}

pub mod gateway {
    pub use perfwatch_gateway::*;
}
