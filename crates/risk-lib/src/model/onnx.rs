//! ONNX classifier inference using tract
//!
//! Loads a binary classifier exported to ONNX (for scikit-learn models:
//! skl2onnx with `zipmap=False`) and runs it on single-row inputs.

use super::manifest::{default_manifest_path, ModelManifest};
use super::{Classifier, Label, ModelLoadError, PredictionError};
use crate::models::{FeatureRecord, FEATURE_NAMES};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based binary classifier
pub struct OnnxClassifier {
    plan: TractModel,
    version: String,
    schema: Vec<String>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("version", &self.version)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load a classifier from disk.
    ///
    /// An explicit `manifest_path` must exist. Without one, the sidecar
    /// next to the model is used when present, otherwise the model is
    /// assumed to consume columns in trained record order.
    pub fn load(model_path: &Path, manifest_path: Option<&Path>) -> Result<Self, ModelLoadError> {
        let manifest = match manifest_path {
            Some(path) => ModelManifest::from_path(path)?,
            None => {
                let sidecar = default_manifest_path(model_path);
                if sidecar.is_file() {
                    ModelManifest::from_path(&sidecar)?
                } else {
                    warn!(
                        model_path = %model_path.display(),
                        "No model manifest found, assuming trained column order"
                    );
                    ModelManifest::positional(version_from_path(model_path))
                }
            }
        };

        let bytes = std::fs::read(model_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelLoadError::NotFound(model_path.to_path_buf())
            } else {
                ModelLoadError::Io {
                    path: model_path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_bytes(&bytes, manifest)
    }

    /// Build a classifier from artifact bytes and its manifest
    pub fn from_bytes(model_bytes: &[u8], manifest: ModelManifest) -> Result<Self, ModelLoadError> {
        manifest.validate()?;

        if let Some(expected) = &manifest.sha256 {
            let actual = hex::encode(Sha256::digest(model_bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ModelLoadError::ChecksumMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let plan = Self::load_model(model_bytes, manifest.feature_names.len())?;

        info!(
            version = %manifest.version,
            positional = manifest.is_positional(),
            size_bytes = model_bytes.len(),
            "Classifier loaded"
        );

        Ok(Self {
            plan,
            version: manifest.version,
            schema: manifest.feature_names,
        })
    }

    /// Parse and optimize an ONNX model for a `[1, width]` f32 input
    fn load_model(model_bytes: &[u8], width: usize) -> Result<TractModel, ModelLoadError> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelLoadError::Format(format!("{:#}", e)))
    }

    /// Returns true if the model consumes columns in trained record order
    pub fn schema_is_positional(&self) -> bool {
        self.schema.iter().map(String::as_str).eq(FEATURE_NAMES)
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, record: &FeatureRecord) -> Result<Label, PredictionError> {
        let start = Instant::now();

        let row = record.row_for(&self.schema)?;
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| PredictionError::Inference(e.to_string()))?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let output = outputs.first().ok_or(PredictionError::EmptyOutput)?;

        let labels = output
            .cast_to::<i64>()
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let raw = labels
            .as_slice::<i64>()
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?
            .first()
            .copied()
            .ok_or(PredictionError::EmptyOutput)?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), raw_label = raw, "Inference completed");
        }

        Label::from_raw(raw)
    }

    fn version(&self) -> &str {
        &self.version
    }
}

fn version_from_path(model_path: &Path) -> String {
    model_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Sorted file names in the directory that should hold the model.
///
/// Shown to the user when loading fails so a misplaced artifact is easy
/// to spot. Unreadable directories yield an empty list.
pub fn directory_listing(model_path: &Path) -> Vec<String> {
    let dir = match model_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Could not list model directory");
            Vec::new()
        }
    };
    names.sort();
    names
}
