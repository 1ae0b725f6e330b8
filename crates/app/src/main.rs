//! LARS risk tool - single-page front end for the risk classifier
//!
//! Loads the classifier once at startup and serves the input page. A
//! missing or unreadable model leaves the page up with prediction disabled.

use anyhow::Result;
use lars_risk_app::{
    api,
    bootstrap::bootstrap,
    config::{AppConfig, LogFormat},
};
use risk_lib::StructuredLogger;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init(),
    }
}

async fn shutdown_signal(logger: StructuredLogger) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    logger.log_shutdown("SIGINT received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(config.log_format);

    info!("Starting lars-risk");

    let logger = StructuredLogger::new(config.listen_addr());
    logger.log_startup(APP_VERSION, &config.model_path.display().to_string());

    let app_state = Arc::new(bootstrap(&config, APP_VERSION, logger.clone()).await);

    api::serve(&config.listen_addr(), app_state, shutdown_signal(logger)).await?;
    info!("Shutting down");

    Ok(())
}
