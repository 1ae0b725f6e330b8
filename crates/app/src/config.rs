//! Application configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional configuration file in the working directory
pub const CONFIG_FILE: &str = "lars-risk";

/// Environment variable prefix, e.g. `LARS_RISK_PORT=9000`
pub const ENV_PREFIX: &str = "LARS_RISK";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the page is served on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the page is served on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Classifier artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Model manifest; defaults to the `.json` sidecar of the model
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_model_path() -> PathBuf {
    PathBuf::from("lars_risk_model.onnx")
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            model_path: default_model_path(),
            manifest_path: None,
            log_format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `lars-risk.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a file base name (extension optional) and environment
    pub fn load_from(file: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// `bind_address:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
