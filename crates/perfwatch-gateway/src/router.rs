//! Axum router wiring.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, obs, ops};

/// Monitoring endpoints without state, for hosts that merge them into their
/// own router before calling `with_state`.
pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mobile/performance-stats", get(api::mobile::performance_stats))
        .route("/api/mobile/track-performance", post(api::mobile::track_performance))
        .route("/api/performance/health", get(api::performance::health))
        .route("/api/performance/quick-test", get(api::performance::quick_test))
        .route("/api/performance/mobile-readiness", get(api::performance::mobile_readiness))
}

pub fn build_router(state: AppState) -> Router {
    monitoring_routes()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(middleware::from_fn_with_state(state.clone(), obs::timing::time_request))
        .with_state(state)
}
