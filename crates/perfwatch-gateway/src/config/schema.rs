use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_core::sampler::DEFAULT_CAPACITY;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub sampler: SamplerSection,

    #[serde(default)]
    pub probes: ProbesSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub assets: AssetsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            sampler: SamplerSection::default(),
            probes: ProbesSection::default(),
            database: DatabaseSection::default(),
            assets: AssetsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PerfWatchError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.sampler.validate()?;
        self.probes.validate()?;
        self.database.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            PerfWatchError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerSection {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self { capacity: default_capacity() }
    }
}

impl SamplerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100_000).contains(&self.capacity) {
            return Err(PerfWatchError::BadRequest(
                "sampler.capacity must be between 1 and 100000".into(),
            ));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbesSection {
    /// Window over which CPU utilisation is sampled. The system probe never
    /// samples over less than sysinfo's minimum refresh interval (200ms).
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
}

impl Default for ProbesSection {
    fn default() -> Self {
        Self { cpu_sample_ms: default_cpu_sample_ms() }
    }
}

impl ProbesSection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=1000).contains(&self.cpu_sample_ms) {
            return Err(PerfWatchError::BadRequest(
                "probes.cpu_sample_ms must be between 10 and 1000".into(),
            ));
        }
        Ok(())
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

fn default_cpu_sample_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    /// `host:port` of the database server. Unset means no database is wired.
    #[serde(default)]
    pub addr: Option<String>,

    #[serde(default = "default_db_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            addr: None,
            timeout_ms: default_db_timeout_ms(),
        }
    }
}

impl DatabaseSection {
    pub fn validate(&self) -> Result<()> {
        if !(50..=30_000).contains(&self.timeout_ms) {
            return Err(PerfWatchError::BadRequest(
                "database.timeout_ms must be between 50 and 30000".into(),
            ));
        }
        if let Some(addr) = &self.addr {
            if addr.trim().is_empty() {
                return Err(PerfWatchError::BadRequest("database.addr must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_db_timeout_ms() -> u64 {
    1000
}

/// Paths are relative to `root` unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsSection {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    #[serde(default = "default_optimized_dir")]
    pub optimized_dir: PathBuf,

    #[serde(default = "default_critical_script")]
    pub critical_script: PathBuf,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            static_dir: default_static_dir(),
            optimized_dir: default_optimized_dir(),
            critical_script: default_critical_script(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_optimized_dir() -> PathBuf {
    PathBuf::from("static/optimized")
}
fn default_critical_script() -> PathBuf {
    PathBuf::from("static/js/critical-mobile.js")
}
