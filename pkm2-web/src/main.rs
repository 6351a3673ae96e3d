//! pkm2-web - SMILES batch submission service
//!
//! Accepts typed or uploaded compound batches, forwards them to the PKM2
//! prediction service, and serves the aggregated results.

use anyhow::{Context, Result};
use clap::Parser;
use pkm2_common::config::{ConfigOverrides, ServiceConfig, ENV_CONFIG};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pkm2_web::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pkm2-web", version, about = "PKM2 batch prediction front service")]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(short, long)]
    bind: Option<String>,

    /// Prediction service endpoint URL
    #[arg(long)]
    prediction_url: Option<String>,

    /// Default confidence level (1-99) when a request omits it
    #[arg(long)]
    confidence: Option<i64>,

    /// Outbound request timeout in seconds (0 disables)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Theme preference file
    #[arg(long)]
    theme_file: Option<PathBuf>,

    /// Log level filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            prediction_url: self.prediction_url.clone(),
            default_confidence: self.confidence,
            request_timeout_secs: self.timeout_secs,
            theme_file: self.theme_file.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServiceConfig::resolve(&args.overrides(), args.config.as_deref())
        .context("Failed to resolve configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting pkm2-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Prediction service: {}", config.prediction_url);
    info!(
        "Default confidence: {}, request timeout: {}",
        config.default_confidence,
        config
            .request_timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config).context("Failed to build prediction client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("pkm2-web listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
