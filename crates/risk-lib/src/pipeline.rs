//! Prediction pipeline
//!
//! On an explicit trigger, builds a feature record from the current input
//! values, runs the classifier and maps the label to a user-facing
//! assessment. Every run is independent: nothing is cached between calls.

use crate::input::InputCollector;
use crate::model::{Label, ModelHandle, PredictionError};
use crate::models::FeatureRecord;
use crate::observability::{AppMetrics, StructuredLogger};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

pub const RISK_PRESENT_HEADLINE: &str = "Prediction: risk present";
pub const RISK_PRESENT_ADVICE: &str =
    "Please consult a specialist for further evaluation and schedule regular follow-up.";
pub const RISK_ABSENT_HEADLINE: &str = "Prediction: no significant risk";
pub const RISK_ABSENT_ADVICE: &str =
    "Keep up healthy habits and continue routine check-ups.";

/// Pipeline lifecycle. `Succeeded` and `Failed` only last until the
/// outcome is displayed; the next trigger starts from `Idle` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Predicting,
    Succeeded,
    Failed,
}

/// User-facing interpretation of a label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub label: i64,
    pub risk_present: bool,
    pub headline: &'static str,
    pub advice: &'static str,
    pub record: FeatureRecord,
    pub model_version: String,
}

impl Assessment {
    /// Label 1 maps to the risk message, anything else to the routine one
    pub fn from_label(label: Label, record: FeatureRecord, model_version: &str) -> Self {
        let risk_present = label.is_risk_present();
        let (headline, advice) = if risk_present {
            (RISK_PRESENT_HEADLINE, RISK_PRESENT_ADVICE)
        } else {
            (RISK_ABSENT_HEADLINE, RISK_ABSENT_ADVICE)
        };

        Self {
            label: label.value(),
            risk_present,
            headline,
            advice,
            record,
            model_version: model_version.to_string(),
        }
    }
}

/// Result of one trigger
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// No model loaded: the trigger was a no-op
    Disabled,
    Succeeded(Assessment),
    Failed(PredictionError),
}

impl PipelineOutcome {
    /// State the pipeline reached for this trigger
    pub fn final_state(&self) -> PipelineState {
        match self {
            PipelineOutcome::Disabled => PipelineState::Idle,
            PipelineOutcome::Succeeded(_) => PipelineState::Succeeded,
            PipelineOutcome::Failed(_) => PipelineState::Failed,
        }
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        match self {
            PipelineOutcome::Succeeded(assessment) => Some(assessment),
            _ => None,
        }
    }
}

/// Runs predictions against an injected model handle
#[derive(Clone)]
pub struct PredictionPipeline {
    model: Option<ModelHandle>,
    metrics: AppMetrics,
    logger: StructuredLogger,
}

impl PredictionPipeline {
    /// `None` means the model failed to load; every trigger is then inert
    pub fn new(model: Option<ModelHandle>, metrics: AppMetrics, logger: StructuredLogger) -> Self {
        Self {
            model,
            metrics,
            logger,
        }
    }

    /// Returns true if triggers will reach the classifier
    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_version(&self) -> Option<&str> {
        self.model.as_ref().map(|model| model.version())
    }

    /// Trigger a prediction from the current input values
    pub fn run(&self, inputs: &InputCollector) -> PipelineOutcome {
        self.run_record(&inputs.snapshot())
    }

    /// Trigger a prediction for an already assembled record
    pub fn run_record(&self, record: &FeatureRecord) -> PipelineOutcome {
        let Some(model) = self.model.as_ref() else {
            self.metrics.inc_disabled_triggers();
            self.logger.log_prediction_disabled();
            return PipelineOutcome::Disabled;
        };

        debug!(state = ?PipelineState::Predicting, record = ?record, "Pipeline transition");
        let start = Instant::now();
        let result = model.predict(record);
        let elapsed = start.elapsed();
        self.metrics.observe_prediction_latency(elapsed.as_secs_f64());

        let outcome = match result {
            Ok(label) => {
                let assessment = Assessment::from_label(label, *record, model.version());
                self.metrics.inc_predictions(assessment.risk_present);
                self.logger.log_prediction(
                    assessment.label,
                    assessment.risk_present,
                    model.version(),
                    elapsed.as_micros() as u64,
                );
                PipelineOutcome::Succeeded(assessment)
            }
            Err(e) => {
                self.metrics.inc_prediction_errors();
                self.logger.log_prediction_failed(&e.to_string(), model.version());
                PipelineOutcome::Failed(e)
            }
        };

        debug!(state = ?outcome.final_state(), "Pipeline transition");
        outcome
    }
}
