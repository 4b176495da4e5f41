//! Shared application state: the composition root for the service.
//!
//! Owns the one sampler instance, the metrics registry, and the collaborators
//! the prober measures. Handlers receive a cheap clone via axum `State`.

use std::sync::Arc;

use perfwatch_core::error::Result;
use perfwatch_core::sampler::PerformanceSampler;

use crate::config::GatewayConfig;
use crate::obs::GatewayMetrics;
use crate::probes::{
    AssetStore, DatabaseHandle, LocalAssets, SysinfoProbe, SystemProbe, TcpDatabase,
    UnconfiguredDatabase,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    sampler: Arc<PerformanceSampler>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    system: Arc<dyn SystemProbe>,
    database: Arc<dyn DatabaseHandle>,
    assets: Arc<dyn AssetStore>,
}

impl AppState {
    /// Build state with the host-backed collaborators described by `cfg`.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let database: Arc<dyn DatabaseHandle> = match &cfg.database.addr {
            Some(addr) => Arc::new(TcpDatabase::new(addr.clone(), cfg.database.timeout())),
            None => {
                tracing::warn!("database.addr not set; database probes will report errors");
                Arc::new(UnconfiguredDatabase)
            }
        };
        let assets = Arc::new(LocalAssets::new(cfg.assets.root.clone()));

        Ok(Self::with_collaborators(cfg, Arc::new(SysinfoProbe::new()), database, assets))
    }

    /// Build state around injected collaborators.
    pub fn with_collaborators(
        cfg: GatewayConfig,
        system: Arc<dyn SystemProbe>,
        database: Arc<dyn DatabaseHandle>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let sampler = Arc::new(PerformanceSampler::with_capacity(cfg.sampler.capacity));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                system,
                database,
                assets,
            }),
            sampler,
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn sampler(&self) -> &PerformanceSampler {
        &self.sampler
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    pub fn system(&self) -> &dyn SystemProbe {
        self.inner.system.as_ref()
    }

    pub fn database(&self) -> &dyn DatabaseHandle {
        self.inner.database.as_ref()
    }

    pub fn assets(&self) -> &dyn AssetStore {
        self.inner.assets.as_ref()
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    /// Gauge lines appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("perfwatch_sampler_entries", self.sampler.len() as u64),
            ("perfwatch_sampler_capacity", self.sampler.capacity() as u64),
        ]
    }
}
