//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use perfwatch_core::error::{PerfWatchError, Result};

pub use schema::{
    AssetsSection, DatabaseSection, GatewayConfig, GatewaySection, ProbesSection, SamplerSection,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PERFWATCH_CONFIG";
/// Config file used when `PERFWATCH_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "perfwatch.yaml";

/// Resolve the config path from the environment.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PerfWatchError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| PerfWatchError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
