//! On-demand probes. Every probe failure is folded into the report as an
//! `"error"` entry; these handlers always answer 200.

use std::time::{Duration, Instant};

use axum::{extract::State, Json};
use chrono::Utc;

use perfwatch_core::probe::{
    elapsed_ms, HealthSnapshot, HealthStatus, QuickTest, QuickTestReport, ReadinessCheck,
    ReadinessReport,
};

use crate::app_state::AppState;
use crate::probes::assets::timed_listing;
use crate::probes::database::timed_query;
use crate::probes::{COUNT_QUERY, LIVENESS_QUERY};

/// Record one probe outcome in metrics and logs, labelled with its report name.
fn observe_probe(
    state: &AppState,
    probe: &'static str,
    time_ms: Option<f64>,
    error: Option<&str>,
) {
    if let Some(error) = error {
        state.metrics().probe_failures.inc(&[("probe", probe)]);
        tracing::warn!(probe, error, "probe failed");
        return;
    }
    if let Some(ms) = time_ms {
        let d = Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default();
        state.metrics().probe_duration.observe(&[("probe", probe)], d);
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthSnapshot> {
    let start = Instant::now();
    let taken_at = Utc::now();

    let sample = state.system().sample(state.cfg().probes.cpu_window()).await;
    let snap = HealthSnapshot::new(
        taken_at,
        sample.memory_percent,
        sample.cpu_percent,
        elapsed_ms(start),
    );

    if snap.status != HealthStatus::Healthy {
        tracing::warn!(
            status = ?snap.status,
            response_time_ms = snap.response_time_ms,
            "health check over budget"
        );
    }
    Json(snap)
}

pub async fn quick_test(State(state): State<AppState>) -> Json<QuickTestReport> {
    let start = Instant::now();

    let db = timed_query(state.database(), LIVENESS_QUERY).await;
    let database = QuickTest::database(db);

    let res_start = Instant::now();
    let sample = state.system().sample(state.cfg().probes.cpu_window()).await;
    let resources = QuickTest::system_resources(
        elapsed_ms(res_start),
        sample.memory_percent,
        sample.cpu_percent,
    );

    let fs = timed_listing(state.assets(), &state.cfg().assets.static_dir).await;
    let filesystem = QuickTest::filesystem(fs);

    let tests = vec![database, resources, filesystem];
    for t in &tests {
        observe_probe(&state, t.name(), Some(t.time_ms()), t.error());
    }
    Json(QuickTestReport::new(elapsed_ms(start), tests))
}

pub async fn mobile_readiness(State(state): State<AppState>) -> Json<ReadinessReport> {
    let start = Instant::now();
    // Taken before any check runs, so this is only the in-process overhead.
    let response_ms = elapsed_ms(start);

    let assets = &state.cfg().assets;
    let css_bundles = state.assets().exists(&assets.optimized_dir).await;
    let js_compression = state.assets().exists(&assets.critical_script).await;

    let db = ReadinessCheck::database(timed_query(state.database(), COUNT_QUERY).await);
    observe_probe(&state, db.name(), db.time_ms(), db.error());

    let checks = vec![
        ReadinessCheck::response_time(response_ms),
        ReadinessCheck::static_optimization(css_bundles, js_compression),
        db,
    ];
    Json(ReadinessReport::new(elapsed_ms(start), checks))
}
