//! HTTP surface tests against the router with fake collaborators.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_gateway::app_state::AppState;
use perfwatch_gateway::config::GatewayConfig;
use perfwatch_gateway::probes::{AssetStore, DatabaseHandle, SystemProbe, SystemSample};
use perfwatch_gateway::router::build_router;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";

struct FixedSystem(SystemSample);

#[async_trait]
impl SystemProbe for FixedSystem {
    async fn sample(&self, _cpu_window: Duration) -> SystemSample {
        self.0
    }
}

/// Takes `delay` to answer, as a loaded host would.
struct SlowSystem {
    delay: Duration,
}

#[async_trait]
impl SystemProbe for SlowSystem {
    async fn sample(&self, _cpu_window: Duration) -> SystemSample {
        tokio::time::sleep(self.delay).await;
        SystemSample::new(42.5, 12.0)
    }
}

struct FakeDb {
    fail_with: Option<&'static str>,
}

#[async_trait]
impl DatabaseHandle for FakeDb {
    async fn execute(&self, _query: &str) -> Result<()> {
        match self.fail_with {
            Some(msg) => Err(PerfWatchError::Unavailable(msg.into())),
            None => Ok(()),
        }
    }
}

struct FakeAssets {
    static_files: usize,
    existing: Vec<PathBuf>,
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn count_entries(&self, _dir: &Path) -> Result<usize> {
        Ok(self.static_files)
    }

    async fn exists(&self, path: &Path) -> bool {
        self.existing.iter().any(|p| p == path)
    }
}

fn all_assets() -> FakeAssets {
    FakeAssets {
        static_files: 3,
        existing: vec![
            PathBuf::from("static/optimized"),
            PathBuf::from("static/js/critical-mobile.js"),
        ],
    }
}

fn no_assets() -> FakeAssets {
    FakeAssets {
        static_files: 0,
        existing: vec![],
    }
}

fn test_app(db: FakeDb, assets: FakeAssets) -> (AppState, Router) {
    let state = AppState::with_collaborators(
        GatewayConfig::default(),
        Arc::new(FixedSystem(SystemSample::new(42.5, 12.0))),
        Arc::new(db),
        Arc::new(assets),
    );
    let app = build_router(state.clone());
    (state, app)
}

fn healthy_app() -> (AppState, Router) {
    test_app(FakeDb { fail_with: None }, all_assets())
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn mobile_get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::USER_AGENT, IPHONE_UA)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route WARN events on this thread into a buffer until the guard drops.
/// `#[tokio::test]` runs on one thread, so handler events land here too.
fn capture_warnings() -> (LogBuffer, DefaultGuard) {
    let buf = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buf, guard)
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn stats_report_no_data_before_tracking() {
    let (_, app) = healthy_app();
    let resp = get(&app, "/api/mobile/performance-stats").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "status": "no_data" }));
}

#[tokio::test]
async fn tracked_mobile_load_shows_in_stats() {
    let (state, app) = healthy_app();

    let resp = post_json(
        &app,
        "/api/mobile/track-performance",
        r#"{"load_time": 0.5, "device_type": "mobile", "page_url": "/x"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let stats = json_body(get(&app, "/api/mobile/performance-stats").await).await;
    assert_eq!(stats["total_mobile_requests"], 1);
    assert_eq!(stats["average_load_time"], 0.5);
    assert_eq!(stats["good_performance_rate"], 100.0);
    assert_eq!(stats["mobile_health"], "good");

    assert_eq!(state.metrics().samples_tracked.get(&[("device", "mobile")]), 1);
}

#[tokio::test]
async fn missing_fields_are_defaulted() {
    let (state, app) = healthy_app();

    let body = json_body(post_json(&app, "/api/mobile/track-performance", "{}").await).await;
    assert_eq!(body["success"], true);

    let entry = state.sampler().recent(1).pop().unwrap();
    assert_eq!(entry.load_time, 0.0);
    assert_eq!(entry.device_type.as_str(), "unknown");
    assert_eq!(entry.page_url, "/");

    // Unknown devices never count as mobile.
    let stats = json_body(get(&app, "/api/mobile/performance-stats").await).await;
    assert_eq!(stats["status"], "no_data");
}

#[tokio::test]
async fn null_fields_are_defaulted() {
    let (state, app) = healthy_app();

    let resp = post_json(
        &app,
        "/api/mobile/track-performance",
        r#"{"load_time": 0.5, "device_type": null, "page_url": "/x"}"#,
    )
    .await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let resp = post_json(
        &app,
        "/api/mobile/track-performance",
        r#"{"load_time": null, "device_type": "mobile", "page_url": null}"#,
    )
    .await;
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let entries = state.sampler().recent(2);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].device_type.as_str(), "unknown");
    assert_eq!(entries[0].page_url, "/x");
    assert_eq!(entries[1].load_time, 0.0);
    assert_eq!(entries[1].device_type.as_str(), "mobile");
    assert_eq!(entries[1].page_url, "/");
    assert_eq!(state.metrics().samples_rejected.get(&[("reason", "BAD_REQUEST")]), 0);
}

#[tokio::test]
async fn malformed_tracking_input_reports_failure_with_200() {
    let (state, app) = healthy_app();

    for body in ["not json", r#"{"load_time": "fast"}"#, r#"{"load_time": -1.0}"#] {
        let resp = post_json(&app, "/api/mobile/track-performance", body).await;
        assert_eq!(resp.status(), StatusCode::OK, "body={body}");
        let json = json_body(resp).await;
        assert_eq!(json["success"], false, "body={body}");
        assert!(!json["error"].as_str().unwrap().is_empty(), "body={body}");
    }

    assert!(state.sampler().is_empty());
    assert_eq!(state.metrics().samples_rejected.get(&[("reason", "BAD_REQUEST")]), 3);
}

#[tokio::test]
async fn health_reports_counters_and_status() {
    let (_, app) = healthy_app();
    let json = json_body(get(&app, "/api/performance/health").await).await;

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["memory_usage"], 42.5);
    assert_eq!(json["cpu_usage"], 12.0);
    assert!(json["timestamp"].is_string());
    assert!(json["server_time"].as_f64().unwrap() > 0.0);
    assert!(json["response_time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn quick_test_all_good() {
    let (state, app) = healthy_app();
    let json = json_body(get(&app, "/api/performance/quick-test").await).await;

    assert_eq!(json["overall_status"], "good");
    assert_eq!(json["mobile_ready"], true);

    let tests = json["tests"].as_array().unwrap();
    let names: Vec<&str> = tests.iter().map(|t| t["test"].as_str().unwrap()).collect();
    assert_eq!(names, ["database_connection", "system_resources", "filesystem_access"]);
    assert!(tests.iter().all(|t| t["status"] == "good"));
    assert_eq!(tests[1]["memory_percent"], 42.5);
    assert_eq!(tests[2]["static_files_count"], 3);

    for probe in ["database_connection", "system_resources", "filesystem_access"] {
        assert_eq!(state.metrics().probe_duration.count(&[("probe", probe)]), 1, "{probe}");
        assert_eq!(state.metrics().probe_failures.get(&[("probe", probe)]), 0, "{probe}");
    }
}

#[tokio::test]
async fn quick_test_folds_database_failure_into_report() {
    let (state, app) = test_app(FakeDb { fail_with: Some("connection refused") }, all_assets());

    let resp = get(&app, "/api/performance/quick-test").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;

    let db = &json["tests"][0];
    assert_eq!(db["test"], "database_connection");
    assert_eq!(db["status"], "error");
    assert_eq!(db["time_ms"], 999.0);
    assert!(db["error"].as_str().unwrap().contains("connection refused"));

    assert_eq!(json["tests"][2]["status"], "good");
    assert_eq!(
        state.metrics().probe_failures.get(&[("probe", "database_connection")]),
        1
    );
}

#[tokio::test]
async fn mobile_readiness_full_score_has_no_recommendations() {
    let (_, app) = healthy_app();
    let json = json_body(get(&app, "/api/performance/mobile-readiness").await).await;

    assert_eq!(json["mobile_readiness_score"], 100.0);
    assert_eq!(json["recommendations"], json!([]));
    assert_eq!(json["checks"].as_array().unwrap().len(), 3);
    assert_eq!(json["checks"][1]["css_bundles"], true);
    assert_eq!(json["checks"][2]["target"], "< 50ms");
}

#[tokio::test]
async fn mobile_readiness_recommends_only_for_failures() {
    let (state, app) = test_app(FakeDb { fail_with: Some("no such table: users") }, no_assets());
    let json = json_body(get(&app, "/api/performance/mobile-readiness").await).await;

    assert_eq!(json["mobile_readiness_score"], 33.3);
    assert_eq!(
        json["recommendations"],
        json!(["Optimize database queries", "Optimize static assets"])
    );
    assert_eq!(json["checks"][0]["status"], "pass");
    assert_eq!(json["checks"][1]["status"], "partial");
    assert_eq!(json["checks"][2]["status"], "error");
    assert_eq!(
        state.metrics().probe_failures.get(&[("probe", "database_performance")]),
        1
    );
}

#[tokio::test]
async fn mobile_requests_get_timing_headers() {
    let (state, app) = healthy_app();

    let resp = mobile_get(&app, "/healthz").await;
    assert_eq!(resp.headers()["x-mobile-optimized"], "true");
    assert!(resp.headers()["x-response-time"].to_str().unwrap().ends_with("ms"));

    let desktop = get(&app, "/healthz").await;
    assert!(desktop.headers().get("x-mobile-optimized").is_none());

    assert_eq!(state.metrics().request_duration.count(&[("mobile", "true")]), 1);
    assert_eq!(state.metrics().request_duration.count(&[("mobile", "false")]), 1);
}

#[tokio::test]
async fn only_slow_mobile_requests_are_logged() {
    let state = AppState::with_collaborators(
        GatewayConfig::default(),
        Arc::new(SlowSystem { delay: Duration::from_millis(250) }),
        Arc::new(FakeDb { fail_with: None }),
        Arc::new(all_assets()),
    );
    let app = build_router(state);
    let (logs, _guard) = capture_warnings();

    let fast = mobile_get(&app, "/healthz").await;
    assert_eq!(fast.status(), StatusCode::OK);
    assert!(logs.contents().is_empty(), "{}", logs.contents());

    let desktop = get(&app, "/api/performance/health").await;
    assert_eq!(desktop.status(), StatusCode::OK);
    assert!(!logs.contents().contains("slow mobile request"), "{}", logs.contents());

    let slow = mobile_get(&app, "/api/performance/health").await;
    let header_ms: f64 = slow.headers()["x-response-time"]
        .to_str()
        .unwrap()
        .trim_end_matches("ms")
        .parse()
        .unwrap();
    assert!(header_ms > 200.0);

    let text = logs.contents();
    assert!(text.contains("WARN"), "{text}");
    assert!(text.contains("slow mobile request"), "{text}");
    assert!(text.contains("path=/api/performance/health"), "{text}");
}

#[tokio::test]
async fn readiness_flips_when_draining() {
    let (state, app) = healthy_app();
    assert_eq!(get(&app, "/readyz").await.status(), StatusCode::OK);

    state.set_draining();
    let resp = get(&app, "/readyz").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(resp).await;
    assert_eq!(json["ready"], false);
    assert_eq!(json["draining"], true);
    assert_eq!(get(&app, "/healthz").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_expose_sampler_size() {
    let (_, app) = healthy_app();
    post_json(
        &app,
        "/api/mobile/track-performance",
        r#"{"load_time": 1.5, "device_type": "desktop", "page_url": "/d"}"#,
    )
    .await;

    let resp = get(&app, "/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("perfwatch_sampler_entries 1"));
    assert!(text.contains("perfwatch_sampler_capacity 1000"));
    assert!(text.contains("perfwatch_samples_tracked_total{device=\"desktop\"} 1"));
}
