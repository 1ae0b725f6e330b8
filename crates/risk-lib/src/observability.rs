//! Observability infrastructure for the risk tool
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcome counters, model state)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AppMetricsInner> = OnceLock::new();

struct AppMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    risk_present_total: IntCounter,
    prediction_errors: IntCounter,
    disabled_triggers: IntCounter,
    model_loaded: IntGauge,
    model_version_info: GaugeVec,
}

impl AppMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "lars_risk_prediction_latency_seconds",
                "Time spent running the classifier for one prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "lars_risk_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            risk_present_total: register_int_counter!(
                "lars_risk_risk_present_total",
                "Number of predictions that reported risk present"
            )
            .expect("Failed to register risk_present_total"),

            prediction_errors: register_int_counter!(
                "lars_risk_prediction_errors_total",
                "Total number of failed predictions"
            )
            .expect("Failed to register prediction_errors"),

            disabled_triggers: register_int_counter!(
                "lars_risk_disabled_triggers_total",
                "Prediction triggers ignored because no model is loaded"
            )
            .expect("Failed to register disabled_triggers"),

            model_loaded: register_int_gauge!(
                "lars_risk_model_loaded",
                "1 if the classifier loaded at startup, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),

            model_version_info: register_gauge_vec!(
                "lars_risk_model_version_info",
                "Information about the currently loaded classifier",
                &["version"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Application metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AppMetrics {
    _private: (),
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AppMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AppMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AppMetricsInner {
        GLOBAL_METRICS.get_or_init(AppMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Count a successful prediction
    pub fn inc_predictions(&self, risk_present: bool) {
        self.inner().predictions_total.inc();
        if risk_present {
            self.inner().risk_present_total.inc();
        }
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    pub fn inc_disabled_triggers(&self) {
        self.inner().disabled_triggers.inc();
    }

    /// Record a successful model load
    pub fn set_model_loaded(&self, version: &str) {
        self.inner().model_loaded.set(1);
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version])
            .set(1.0);
    }

    /// Record a failed model load
    pub fn set_model_unavailable(&self) {
        self.inner().model_loaded.set(0);
        self.inner().model_version_info.reset();
    }

    /// Number of classifier calls timed, successful or not
    pub fn prediction_latency_samples(&self) -> u64 {
        self.inner().prediction_latency_seconds.get_sample_count()
    }

    pub fn predictions_total(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn prediction_errors(&self) -> u64 {
        self.inner().prediction_errors.get()
    }

    pub fn disabled_triggers(&self) -> u64 {
        self.inner().disabled_triggers.get()
    }
}

/// Structured logger for application events
///
/// Provides consistent JSON-formatted logging for model loading,
/// predictions and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log application startup
    pub fn log_startup(&self, version: &str, model_path: &str) {
        info!(
            event = "app_started",
            instance = %self.instance,
            app_version = %version,
            model_path = %model_path,
            "LARS risk tool started"
        );
    }

    /// Log application shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "app_shutdown",
            instance = %self.instance,
            reason = %reason,
            "LARS risk tool shutting down"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, positional: bool) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_version = %model_version,
            positional_schema = positional,
            "Classifier loaded, prediction enabled"
        );
    }

    pub fn log_model_load_failed(&self, model_path: &str, reason: &str, directory_files: &[String]) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            model_path = %model_path,
            reason = %reason,
            directory_files = ?directory_files,
            "Classifier failed to load, prediction disabled"
        );
    }

    /// Log a prediction outcome
    pub fn log_prediction(&self, label: i64, risk_present: bool, model_version: &str, duration_us: u64) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            label = label,
            risk_present = risk_present,
            model_version = %model_version,
            duration_us = duration_us,
            "Generated risk prediction"
        );
    }

    pub fn log_prediction_failed(&self, reason: &str, model_version: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            reason = %reason,
            model_version = %model_version,
            "Risk prediction failed"
        );
    }

    pub fn log_prediction_disabled(&self) {
        warn!(
            event = "prediction_disabled",
            instance = %self.instance,
            "Prediction requested but no classifier is loaded"
        );
    }
}
