//! Shared error type across perfwatch crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or config.
    BadRequest,
    /// A collaborator (database, filesystem) could not be reached.
    Unavailable,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PerfWatchError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum PerfWatchError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl PerfWatchError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            PerfWatchError::BadRequest(_) => ClientCode::BadRequest,
            PerfWatchError::Unavailable(_) => ClientCode::Unavailable,
            PerfWatchError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            PerfWatchError::Internal(_) => ClientCode::Internal,
        }
    }
}
