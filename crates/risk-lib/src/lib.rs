//! Core library for the LARS risk prediction tool
//!
//! This crate provides the core functionality for:
//! - The eight-column feature record and its bounded input controls
//! - Loading the binary risk classifier and running it
//! - The prediction pipeline mapping labels to recommendations
//! - Status reporting and observability

pub mod input;
pub mod model;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod status;

pub use input::{InputCollector, InputError, NumericControl};
pub use model::{Classifier, Label, ModelHandle, ModelLoadError, OnnxClassifier, PredictionError};
pub use models::*;
pub use observability::{AppMetrics, StructuredLogger};
pub use pipeline::{Assessment, PipelineOutcome, PipelineState, PredictionPipeline};
pub use status::{
    ComponentStatus, EnvironmentInfo, HealthResponse, ModelStatus, ReadinessResponse, Stage,
    StatusReport, StatusReporter,
};
