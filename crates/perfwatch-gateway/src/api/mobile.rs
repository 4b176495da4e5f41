use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_core::sampler::{DeviceType, StatsReport};

use crate::app_state::AppState;

/// Body of `POST /api/mobile/track-performance`. Missing or `null` fields
/// default to `0`, `"unknown"` and `"/"`.
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub load_time: Option<f64>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Failures are reported in the body; the HTTP status stays 200.
pub async fn track_performance(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<TrackResponse> {
    match record(&state, &body) {
        Ok(device) => {
            state.metrics().samples_tracked.inc(&[("device", device.as_str())]);
            Json(TrackResponse { success: true, error: None })
        }
        Err(e) => {
            state
                .metrics()
                .samples_rejected
                .inc(&[("reason", e.client_code().as_str())]);
            tracing::debug!(error = %e, "tracking call rejected");
            Json(TrackResponse {
                success: false,
                error: Some(e.to_string()),
            })
        }
    }
}

fn record(state: &AppState, body: &[u8]) -> Result<DeviceType> {
    let req: TrackRequest = serde_json::from_slice(body)
        .map_err(|e| PerfWatchError::BadRequest(format!("invalid tracking payload: {e}")))?;

    let load_time = req.load_time.unwrap_or(0.0);
    if !load_time.is_finite() || load_time < 0.0 {
        return Err(PerfWatchError::BadRequest(
            "load_time must be a non-negative number of seconds".into(),
        ));
    }

    let device = req.device_type.as_deref().map_or(DeviceType::Unknown, DeviceType::parse);
    let page_url = req.page_url.unwrap_or_else(|| "/".to_string());
    state.sampler().track(load_time, device, page_url);
    Ok(device)
}

pub async fn performance_stats(State(state): State<AppState>) -> Json<StatsReport> {
    Json(state.sampler().stats())
}
