//! Model manifest: the sidecar JSON describing an artifact
//!
//! ```json
//! {
//!   "version": "2024.1",
//!   "feature_names": ["age", "BMI", "tumor_dist", "surg_time",
//!                     "exhaust", "tumor_size", "TNM", "neoadjuvant"],
//!   "sha256": "..."
//! }
//! ```

use super::ModelLoadError;
use crate::models::{field_spec, FEATURE_NAMES, NUM_FEATURES};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Metadata shipped next to the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: String,
    /// Column names in the order the model consumes them
    pub feature_names: Vec<String>,
    /// Hex-encoded SHA-256 of the artifact bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ModelManifest {
    /// Manifest for an artifact shipped without one: trained column order
    pub fn positional(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            feature_names: positional_schema(),
            sha256: None,
        }
    }

    /// Read and validate a manifest file
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelLoadError::NotFound(path.to_path_buf())
            } else {
                ModelLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let manifest: ModelManifest =
            serde_json::from_str(&text).map_err(|e| ModelLoadError::Manifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the declared columns against the feature record
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.feature_names.len() != NUM_FEATURES {
            return Err(ModelLoadError::Schema(format!(
                "manifest declares {} columns, feature record has {}",
                self.feature_names.len(),
                NUM_FEATURES
            )));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if field_spec(name).is_none() {
                return Err(ModelLoadError::Schema(format!("unknown column '{}'", name)));
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelLoadError::Schema(format!("duplicate column '{}'", name)));
            }
        }

        Ok(())
    }

    /// Returns true if the model consumes columns in trained record order
    pub fn is_positional(&self) -> bool {
        self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES)
    }
}

/// Trained column order as owned strings
pub fn positional_schema() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// `lars_risk_model.onnx` -> `lars_risk_model.json`
pub fn default_manifest_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("json")
}
