//! Collaborators the prober measures.
//!
//! Each collaborator sits behind a trait so the composition root can inject a
//! real implementation and tests can inject fakes:
//! - `SystemProbe`    : memory and CPU utilisation
//! - `DatabaseHandle` : run a query, report success or failure
//! - `AssetStore`     : list a directory, check a path exists

pub mod assets;
pub mod database;
pub mod system;

pub use assets::{AssetStore, LocalAssets};
pub use database::{DatabaseHandle, TcpDatabase, UnconfiguredDatabase, COUNT_QUERY, LIVENESS_QUERY};
pub use system::{SysinfoProbe, SystemProbe, SystemSample};
