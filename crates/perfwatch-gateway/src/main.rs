//! perfwatch gateway
//!
//! - Mobile page-load tracking: /api/mobile/*
//! - On-demand probes: /api/performance/*
//! - Ops: /healthz, /readyz, /metrics
//! - Ctrl-C flips readiness to draining, then drains in-flight requests

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code().as_str(), "perfwatch-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "perfwatch-gateway starting");
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| PerfWatchError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| PerfWatchError::Internal(format!("server failed: {e}")))?;

    tracing::info!("perfwatch-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("shutdown requested, draining");
}
