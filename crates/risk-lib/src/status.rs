//! Status reporting for the risk tool
//!
//! Tracks coarse startup stages and the model load outcome for display on
//! the page and for liveness/readiness probes. Nothing here affects
//! prediction correctness.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Startup stage with its progress checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initializing,
    ModelLoading,
    ModelLoaded,
    InputReady,
    PredictionReady,
    Ready,
}

impl Stage {
    /// Progress percentage shown while starting up
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Initializing => 10,
            Stage::ModelLoading => 30,
            Stage::ModelLoaded => 50,
            Stage::InputReady => 70,
            Stage::PredictionReady => 90,
            Stage::Ready => 100,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Initializing => "Checking environment...",
            Stage::ModelLoading => "Loading model...",
            Stage::ModelLoaded => "Model loaded",
            Stage::InputReady => "Preparing input form...",
            Stage::PredictionReady => "Preparing prediction...",
            Stage::Ready => "Application ready",
        }
    }
}

/// Outcome of the one-time model load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ModelStatus {
    Pending,
    Loaded {
        version: String,
    },
    Failed {
        message: String,
        /// Files found where the model was expected
        directory_files: Vec<String>,
    },
}

impl ModelStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelStatus::Loaded { .. })
    }
}

/// Health status of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Functioning normally
    Healthy,
    /// Page is served but prediction is unavailable
    Degraded,
}

/// Runtime environment shown on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub app_version: String,
    pub os: String,
    pub arch: String,
    pub started_at: i64,
}

impl EnvironmentInfo {
    pub fn current(app_version: &str) -> Self {
        Self {
            app_version: app_version.to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            started_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Snapshot of everything the status reporter tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub stage: Stage,
    pub progress: u8,
    pub description: String,
    pub model: ModelStatus,
    pub environment: EnvironmentInfo,
    pub last_update_timestamp: i64,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
struct StatusInner {
    stage: Stage,
    model: ModelStatus,
    last_update_timestamp: i64,
}

/// Status reporter shared between startup and the HTTP handlers
#[derive(Debug, Clone)]
pub struct StatusReporter {
    inner: Arc<RwLock<StatusInner>>,
    environment: Arc<EnvironmentInfo>,
}

impl StatusReporter {
    pub fn new(environment: EnvironmentInfo) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StatusInner {
                stage: Stage::Initializing,
                model: ModelStatus::Pending,
                last_update_timestamp: chrono::Utc::now().timestamp(),
            })),
            environment: Arc::new(environment),
        }
    }

    /// Move to a later stage. Stages never go backwards.
    pub async fn advance(&self, stage: Stage) {
        let mut inner = self.inner.write().await;
        if stage > inner.stage {
            inner.stage = stage;
            inner.last_update_timestamp = chrono::Utc::now().timestamp();
        }
    }

    /// Record a successful model load
    pub async fn model_loaded(&self, version: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.model = ModelStatus::Loaded {
            version: version.into(),
        };
        if inner.stage < Stage::ModelLoaded {
            inner.stage = Stage::ModelLoaded;
        }
        inner.last_update_timestamp = chrono::Utc::now().timestamp();
    }

    /// Record a failed model load
    pub async fn model_failed(&self, message: impl Into<String>, directory_files: Vec<String>) {
        let mut inner = self.inner.write().await;
        inner.model = ModelStatus::Failed {
            message: message.into(),
            directory_files,
        };
        inner.last_update_timestamp = chrono::Utc::now().timestamp();
    }

    pub async fn stage(&self) -> Stage {
        self.inner.read().await.stage
    }

    pub async fn model_status(&self) -> ModelStatus {
        self.inner.read().await.model.clone()
    }

    /// Full status snapshot
    pub async fn report(&self) -> StatusReport {
        let inner = self.inner.read().await;
        StatusReport {
            stage: inner.stage,
            progress: inner.stage.progress(),
            description: inner.stage.description().to_string(),
            model: inner.model.clone(),
            environment: (*self.environment).clone(),
            last_update_timestamp: inner.last_update_timestamp,
        }
    }

    /// Healthy with a model, degraded without one (the page still works)
    pub async fn health(&self) -> HealthResponse {
        match &self.inner.read().await.model {
            ModelStatus::Loaded { .. } => HealthResponse {
                status: ComponentStatus::Healthy,
                message: None,
            },
            ModelStatus::Pending => HealthResponse {
                status: ComponentStatus::Degraded,
                message: Some("Model not loaded yet".to_string()),
            },
            ModelStatus::Failed { message, .. } => HealthResponse {
                status: ComponentStatus::Degraded,
                message: Some(format!("Prediction unavailable: {}", message)),
            },
        }
    }

    /// Ready once startup completed, whether or not the model loaded
    pub async fn readiness(&self) -> ReadinessResponse {
        let stage = self.stage().await;
        if stage == Stage::Ready {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some(format!("Startup in progress: {}", stage.description())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> StatusReporter {
        StatusReporter::new(EnvironmentInfo::current("0.1.0"))
    }

    #[test]
    fn test_stage_progress_checkpoints() {
        let progress: Vec<u8> = [
            Stage::Initializing,
            Stage::ModelLoading,
            Stage::ModelLoaded,
            Stage::InputReady,
            Stage::PredictionReady,
            Stage::Ready,
        ]
        .iter()
        .map(Stage::progress)
        .collect();
        assert_eq!(progress, vec![10, 30, 50, 70, 90, 100]);
    }

    #[tokio::test]
    async fn test_initial_state() {
        let status = reporter();
        let report = status.report().await;

        assert_eq!(report.stage, Stage::Initializing);
        assert_eq!(report.progress, 10);
        assert_eq!(report.model, ModelStatus::Pending);
        assert_eq!(report.environment.app_version, "0.1.0");
    }

    #[tokio::test]
    async fn test_stages_never_go_backwards() {
        let status = reporter();
        status.advance(Stage::InputReady).await;
        status.advance(Stage::ModelLoading).await;

        assert_eq!(status.stage().await, Stage::InputReady);
    }

    #[tokio::test]
    async fn test_model_loaded_is_healthy() {
        let status = reporter();
        status.advance(Stage::ModelLoading).await;
        status.model_loaded("v1").await;

        assert_eq!(status.stage().await, Stage::ModelLoaded);
        assert!(status.model_status().await.is_loaded());

        let health = status.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.message.is_none());
    }

    #[tokio::test]
    async fn test_model_failure_is_degraded_not_unhealthy() {
        let status = reporter();
        status
            .model_failed("model file not found", vec!["app.py".to_string()])
            .await;

        let health = status.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.message.unwrap().contains("model file not found"));

        match status.model_status().await {
            ModelStatus::Failed { directory_files, .. } => {
                assert_eq!(directory_files, vec!["app.py".to_string()]);
            }
            other => panic!("unexpected model status: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_readiness_follows_startup() {
        let status = reporter();
        let readiness = status.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());

        status.model_failed("corrupt", Vec::new()).await;
        status.advance(Stage::Ready).await;

        let readiness = status.readiness().await;
        assert!(readiness.ready);
    }

    #[test]
    fn test_model_status_serialization() {
        let json = serde_json::to_value(ModelStatus::Loaded {
            version: "v1".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "loaded");
        assert_eq!(json["version"], "v1");
    }
}
