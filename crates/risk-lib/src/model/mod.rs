//! Model handle for the risk classifier
//!
//! The classifier is an opaque artifact behind the [`Classifier`] trait.
//! It is loaded once at startup and shared read-only afterwards.

mod error;
mod manifest;
mod onnx;

pub use error::{ModelLoadError, PredictionError};
pub use manifest::{default_manifest_path, positional_schema, ModelManifest};
pub use onnx::{directory_listing, OnnxClassifier};

use crate::models::FeatureRecord;
use serde::Serialize;
use std::sync::Arc;

/// Binary output of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Label(i64);

impl Label {
    /// Risk absent
    pub const ABSENT: Label = Label(0);
    /// Risk present
    pub const PRESENT: Label = Label(1);

    /// Accept a raw model output, rejecting anything outside {0, 1}
    pub fn from_raw(raw: i64) -> Result<Self, PredictionError> {
        match raw {
            0 | 1 => Ok(Label(raw)),
            other => Err(PredictionError::UnexpectedLabel(other)),
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Only label 1 counts as risk present
    pub fn is_risk_present(&self) -> bool {
        self.0 == 1
    }
}

/// Trait for classifier implementations
pub trait Classifier: Send + Sync {
    /// Classify a single feature record
    fn predict(&self, record: &FeatureRecord) -> Result<Label, PredictionError>;

    /// Version string of the loaded artifact
    fn version(&self) -> &str;
}

/// Shared handle to the process-wide classifier
pub type ModelHandle = Arc<dyn Classifier>;
