//! Request timing middleware.
//!
//! Every request is observed in `perfwatch_request_duration_micros`, labelled
//! by whether the `User-Agent` looks like a mobile device. Mobile responses
//! carry `X-Mobile-Optimized` and `X-Response-Time` headers, and slow mobile
//! requests are logged.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;

/// Lower-case `User-Agent` fragments that mark a mobile client.
const MOBILE_MARKERS: [&str; 7] = [
    "mobile",
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "windows phone",
];

/// Mobile requests slower than this (ms) are logged.
pub const SLOW_MOBILE_REQUEST_MS: f64 = 200.0;

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}

pub async fn time_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let mobile = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(is_mobile_user_agent)
        .unwrap_or(false);
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut resp = next.run(req).await;

    let elapsed = start.elapsed();
    state
        .metrics()
        .request_duration
        .observe(&[("mobile", if mobile { "true" } else { "false" })], elapsed);

    if mobile {
        let ms = elapsed.as_secs_f64() * 1000.0;
        let headers = resp.headers_mut();
        headers.insert("x-mobile-optimized", HeaderValue::from_static("true"));
        if let Ok(v) = HeaderValue::from_str(&format!("{ms:.2}ms")) {
            headers.insert("x-response-time", v);
        }
        if ms > SLOW_MOBILE_REQUEST_MS {
            tracing::warn!(%method, %path, elapsed_ms = ms, "slow mobile request");
        }
    }

    resp
}
