//! Startup wiring: one-time model load and application state
//!
//! A model that cannot be loaded is not fatal. The state is still built,
//! with the failure and the model directory listing recorded for the page
//! and a pipeline whose triggers are inert.

use crate::api::AppState;
use crate::config::AppConfig;
use risk_lib::{
    model::directory_listing, AppMetrics, Classifier, EnvironmentInfo, ModelHandle,
    OnnxClassifier, PredictionPipeline, Stage, StatusReporter, StructuredLogger,
};
use std::sync::Arc;

/// Load the configured model once and assemble the application state.
///
/// Stages advance from model loading to ready whatever the load result.
pub async fn bootstrap(config: &AppConfig, app_version: &str, logger: StructuredLogger) -> AppState {
    let status = StatusReporter::new(EnvironmentInfo::current(app_version));
    let metrics = AppMetrics::new();

    status.advance(Stage::ModelLoading).await;
    let model = load_model(config, &status, &metrics, &logger).await;

    status.advance(Stage::InputReady).await;
    let pipeline = PredictionPipeline::new(model, metrics, logger);
    status.advance(Stage::PredictionReady).await;

    let state = AppState::new(status.clone(), pipeline);
    status.advance(Stage::Ready).await;
    state
}

async fn load_model(
    config: &AppConfig,
    status: &StatusReporter,
    metrics: &AppMetrics,
    logger: &StructuredLogger,
) -> Option<ModelHandle> {
    match OnnxClassifier::load(&config.model_path, config.manifest_path.as_deref()) {
        Ok(classifier) => {
            let positional = classifier.schema_is_positional();
            let handle: ModelHandle = Arc::new(classifier);
            status.model_loaded(handle.version()).await;
            metrics.set_model_loaded(handle.version());
            logger.log_model_loaded(handle.version(), positional);
            Some(handle)
        }
        Err(e) => {
            let files = directory_listing(&config.model_path);
            logger.log_model_load_failed(
                &config.model_path.display().to_string(),
                &e.to_string(),
                &files,
            );
            status.model_failed(e.to_string(), files).await;
            metrics.set_model_unavailable();
            None
        }
    }
}
