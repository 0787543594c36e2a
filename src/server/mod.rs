use crate::error::AppError;
use crate::matching::{CandidateProfile, MatchEngine, MatchReport};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Deserialize)]
pub struct ParseCvRequest {
    pub cv_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub cv_text: String,
    pub vacancies: Vec<Value>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Builds the HTTP router plus the readiness flag the caller flips once the
/// listener is bound.
pub fn build(engine: Arc<MatchEngine>) -> (Router, Arc<AtomicBool>) {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness = Arc::new(AtomicBool::new(false));
    let state = AppState {
        engine,
        readiness: readiness.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let router = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/candidates/parse", post(parse_cv_endpoint))
        .route("/api/v1/matches", post(match_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    (router, readiness)
}

async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn parse_cv_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ParseCvRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    let profile = state.engine.extract_profile(&payload.cv_text)?;
    Ok(Json(profile))
}

/// Ranking may perform one blocking embedding request, so the whole call
/// moves off the async runtime.
async fn match_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let MatchRequest {
        cv_text,
        vacancies,
        limit,
    } = payload;
    let engine = state.engine.clone();

    let report =
        tokio::task::spawn_blocking(move || engine.rank(&cv_text, &vacancies, limit)).await??;

    Ok(Json(report))
}
