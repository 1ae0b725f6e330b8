//! Integration tests for the page and API endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use lars_risk_app::{
    api::{create_router, AppState},
    page::{MODEL_UNAVAILABLE_WARNING, PREDICTION_FAILED_PREFIX, PREDICT_BUTTON},
};
use risk_lib::{
    model::positional_schema,
    pipeline::{RISK_ABSENT_HEADLINE, RISK_PRESENT_HEADLINE},
    AppMetrics, Classifier, EnvironmentInfo, FeatureRecord, Label, ModelHandle, PredictionError,
    PredictionPipeline, Stage, StatusReporter, StructuredLogger,
};
use std::sync::Arc;
use tower::ServiceExt;

/// Flags risk for large tumors
struct TumorSizeClassifier {
    schema: Vec<String>,
}

impl Classifier for TumorSizeClassifier {
    fn predict(&self, record: &FeatureRecord) -> Result<Label, PredictionError> {
        let row = record.row_for(&self.schema)?;
        Label::from_raw(if row[5] > 5.0 { 1 } else { 0 })
    }

    fn version(&self) -> &str {
        "test-v1"
    }
}

/// Always fails as if the model expected another input width
struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _record: &FeatureRecord) -> Result<Label, PredictionError> {
        Err(PredictionError::ShapeMismatch {
            expected: 9,
            actual: 8,
        })
    }

    fn version(&self) -> &str {
        "broken"
    }
}

async fn setup_app(model: Option<ModelHandle>) -> (Router, Arc<AppState>) {
    let status = StatusReporter::new(EnvironmentInfo::current("0.1.0-test"));
    status.advance(Stage::ModelLoading).await;
    match &model {
        Some(handle) => status.model_loaded(handle.version()).await,
        None => {
            status
                .model_failed(
                    "model file not found: lars_risk_model.onnx",
                    vec!["app.py".to_string()],
                )
                .await
        }
    }
    status.advance(Stage::Ready).await;

    let pipeline = PredictionPipeline::new(model, AppMetrics::new(), StructuredLogger::new("test"));
    let state = Arc::new(AppState::new(status, pipeline));
    (create_router(state.clone()), state)
}

async fn loaded_app() -> Router {
    let model: ModelHandle = Arc::new(TumorSizeClassifier {
        schema: positional_schema(),
    });
    setup_app(Some(model)).await.0
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_renders_form_and_button() {
    let app = loaded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    for name in risk_lib::FEATURE_NAMES {
        assert!(html.contains(&format!("name=\"{}\"", name)), "missing {}", name);
    }
    assert!(html.contains(PREDICT_BUTTON));
    assert!(!html.contains("Result"));
}

#[tokio::test]
async fn test_predict_form_with_defaults() {
    let app = loaded_app().await;

    let response = app
        .oneshot(form_request(
            "age=50&BMI=22&tumor_dist=5&surg_time=180&exhaust=2&tumor_size=3&TNM=2&neoadjuvant=0",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(RISK_ABSENT_HEADLINE));
}

#[tokio::test]
async fn test_predict_form_keeps_submitted_values() {
    let app = loaded_app().await;

    let response = app
        .oneshot(form_request("tumor_size=8.5"))
        .await
        .unwrap();
    let html = body_string(response).await;

    assert!(html.contains(RISK_PRESENT_HEADLINE));
    assert!(html.contains("value=\"8.5\""));
}

#[tokio::test]
async fn test_predict_form_rejected_entry_skips_prediction() {
    let app = loaded_app().await;

    let response = app.oneshot(form_request("age=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("field-error"));
    assert!(!html.contains(RISK_ABSENT_HEADLINE));
    assert!(!html.contains(RISK_PRESENT_HEADLINE));
}

#[tokio::test]
async fn test_without_model_page_warns_and_trigger_is_inert() {
    let (app, _state) = setup_app(None).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains(MODEL_UNAVAILABLE_WARNING));
    assert!(html.contains("<li>app.py</li>"));
    assert!(!html.contains("<button"));

    let response = app.oneshot(form_request("age=60")).await.unwrap();
    let html = body_string(response).await;
    assert!(!html.contains(RISK_ABSENT_HEADLINE));
    assert!(!html.contains(RISK_PRESENT_HEADLINE));
}

#[tokio::test]
async fn test_prediction_failure_is_shown_and_app_stays_usable() {
    let model: ModelHandle = Arc::new(BrokenClassifier);
    let (app, _state) = setup_app(Some(model)).await;

    let response = app.clone().oneshot(form_request("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(PREDICTION_FAILED_PREFIX));

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_predict_returns_assessment() {
    let app = loaded_app().await;

    let response = app
        .oneshot(json_request(serde_json::json!({"tumor_size": 12.0, "TNM": 3.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["label"], 1);
    assert_eq!(body["risk_present"], true);
    assert_eq!(body["headline"], RISK_PRESENT_HEADLINE);
    assert_eq!(body["record"]["TNM"], 3.0);
    assert_eq!(body["record"]["age"], 50.0);
    assert_eq!(body["model_version"], "test-v1");
}

#[tokio::test]
async fn test_api_predict_rejects_unknown_field() {
    let app = loaded_app().await;

    let response = app
        .oneshot(json_request(serde_json::json!({"weight": 70.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["details"][0], "unknown input field 'weight'");
}

#[tokio::test]
async fn test_api_predict_without_model_returns_503() {
    let (app, _state) = setup_app(None).await;

    let response = app.oneshot(json_request(serde_json::json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_api_predict_failure_returns_500() {
    let model: ModelHandle = Arc::new(BrokenClassifier);
    let (app, _state) = setup_app(Some(model)).await;

    let response = app.oneshot(json_request(serde_json::json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("shape mismatch"));
}

#[tokio::test]
async fn test_schema_endpoint_lists_fields() {
    let app = loaded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/api/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["prediction_enabled"], true);
    assert_eq!(body["model_version"], "test-v1");
    assert_eq!(body["fields"].as_array().unwrap().len(), 8);
    assert_eq!(body["fields"][6]["name"], "TNM");
    assert_eq!(body["fields"][6]["max"], 4.0);
}

#[tokio::test]
async fn test_status_endpoint_reports_failure() {
    let (app, _state) = setup_app(None).await;

    let response = app
        .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();

    assert_eq!(body["stage"], "ready");
    assert_eq!(body["progress"], 100);
    assert_eq!(body["model"]["state"], "failed");
    assert_eq!(body["model"]["directory_files"][0], "app.py");
}

#[tokio::test]
async fn test_healthz_degraded_without_model() {
    let (app, _state) = setup_app(None).await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Degraded still returns 200 (page is served)
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_healthy_with_model() {
    let app = loaded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readyz_returns_503_during_startup() {
    let status = StatusReporter::new(EnvironmentInfo::current("0.1.0-test"));
    let pipeline = PredictionPipeline::new(None, AppMetrics::new(), StructuredLogger::new("test"));
    let app = create_router(Arc::new(AppState::new(status.clone(), pipeline)));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    status.advance(Stage::Ready).await;
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = loaded_app().await;

    // Generate at least one prediction sample
    let _ = app
        .clone()
        .oneshot(json_request(serde_json::json!({})))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("lars_risk_predictions_total"));
    assert!(body.contains("lars_risk_prediction_latency_seconds"));
}
