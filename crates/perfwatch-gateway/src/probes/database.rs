use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_core::probe::elapsed_ms;

/// Minimal liveness query used by the quick performance test.
pub const LIVENESS_QUERY: &str = "SELECT 1";
/// Representative read used by the mobile readiness check.
pub const COUNT_QUERY: &str = "SELECT COUNT(*) FROM users LIMIT 1";

/// The slice of a database driver the prober needs.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Run `query`, discarding any rows.
    async fn execute(&self, query: &str) -> Result<()>;
}

/// Time one query. Returns the elapsed milliseconds, or the failure.
pub async fn timed_query(db: &dyn DatabaseHandle, query: &str) -> Result<f64> {
    let start = Instant::now();
    db.execute(query).await?;
    Ok(elapsed_ms(start))
}

/// Reachability-only handle: a query succeeds when the configured server
/// accepts a TCP connection within the timeout. The query text is not sent.
/// Hosts that embed a real driver implement [`DatabaseHandle`] on it instead.
#[derive(Debug, Clone)]
pub struct TcpDatabase {
    addr: String,
    timeout: Duration,
}

impl TcpDatabase {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DatabaseHandle for TcpDatabase {
    async fn execute(&self, query: &str) -> Result<()> {
        tracing::debug!(addr = %self.addr, query, "database reachability probe");
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(PerfWatchError::Unavailable(format!(
                "database connect {} failed: {e}",
                self.addr
            ))),
            Err(_) => Err(PerfWatchError::Unavailable(format!(
                "database connect {} timed out after {}ms",
                self.addr,
                self.timeout.as_millis()
            ))),
        }
    }
}

/// Used when no database is configured; every query fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredDatabase;

#[async_trait]
impl DatabaseHandle for UnconfiguredDatabase {
    async fn execute(&self, _query: &str) -> Result<()> {
        Err(PerfWatchError::Unavailable("database not configured".into()))
    }
}
