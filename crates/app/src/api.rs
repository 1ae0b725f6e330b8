//! HTTP surface: the prediction page, JSON API, health checks and metrics

use crate::error::{ApiError, ApiResult};
use crate::page::{self, PageView};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use risk_lib::{
    Assessment, FieldSpec, InputCollector, PipelineOutcome, PredictionPipeline,
    StatusReporter, FIELD_SPECS,
};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub status: StatusReporter,
    pub pipeline: PredictionPipeline,
}

impl AppState {
    pub fn new(status: StatusReporter, pipeline: PredictionPipeline) -> Self {
        Self { status, pipeline }
    }
}

/// The page with default inputs and no result
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let report = state.status.report().await;
    let inputs = InputCollector::new();

    Html(page::render(&PageView {
        status: &report,
        inputs: &inputs,
        input_errors: &[],
        outcome: None,
    }))
}

/// Predict button. Rejected entries are shown on their controls and the
/// pipeline is not triggered.
async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let report = state.status.report().await;
    let mut inputs = InputCollector::new();
    let input_errors = inputs.apply_form(&form);

    let outcome = if input_errors.is_empty() {
        Some(state.pipeline.run(&inputs))
    } else {
        None
    };

    Html(page::render(&PageView {
        status: &report,
        inputs: &inputs,
        input_errors: &input_errors,
        outcome: outcome.as_ref(),
    }))
}

/// JSON prediction; fields missing from the body take their defaults
async fn predict_json(
    State(state): State<Arc<AppState>>,
    Json(values): Json<HashMap<String, f64>>,
) -> ApiResult<Json<Assessment>> {
    let mut inputs = InputCollector::new();
    let errors = inputs.apply_values(&values);
    if !errors.is_empty() {
        return Err(ApiError::InvalidInput(errors));
    }

    match state.pipeline.run(&inputs) {
        PipelineOutcome::Succeeded(assessment) => Ok(Json(assessment)),
        PipelineOutcome::Failed(e) => Err(ApiError::Prediction(e)),
        PipelineOutcome::Disabled => Err(ApiError::PredictionDisabled),
    }
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    fields: &'static [FieldSpec],
    prediction_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_version: Option<String>,
}

async fn schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        fields: &FIELD_SPECS,
        prediction_enabled: state.pipeline.is_enabled(),
        model_version: state.pipeline.model_version().map(str::to_string),
    })
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.status.report().await)
}

/// Health check - 200 while the page is served, even without a model
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Degraded still answers 200: the page stays usable without a model
    (StatusCode::OK, Json(state.status.health().await))
}

/// Readiness check - 200 once startup completed
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.status.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/api/schema", get(schema))
        .route("/api/status", get(status))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the application until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting LARS risk page");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
