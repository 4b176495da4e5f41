//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness, always 200 while the process serves requests
//! - `/readyz`  : readiness as JSON, 503 once shutdown has begun
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app_state::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz(State(state): State<AppState>) -> Response {
    let draining = state.is_draining();
    let code = if draining {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = json!({
        "ready": !draining,
        "draining": draining,
        "sampler_entries": state.sampler().len(),
    });
    (code, Json(body)).into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render(&state.metrics_extra());
    ([(header::CONTENT_TYPE, PROMETHEUS_TEXT)], body).into_response()
}
