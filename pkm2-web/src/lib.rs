//! pkm2-web library interface
//!
//! HTTP service that accepts SMILES batches (typed text or uploaded
//! spreadsheet), forwards them to the prediction service, and returns
//! display-ready result rows and label counts.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use pkm2_common::config::ServiceConfig;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::{PredictionClient, PredictionError, SubmissionCoordinator, ThemeStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
    /// Single-flight submission pipeline
    pub coordinator: SubmissionCoordinator,
    /// Persisted UI theme
    pub theme: ThemeStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, PredictionError> {
        let client = PredictionClient::new(config.prediction_url.clone(), config.request_timeout)?;
        let theme = ThemeStore::load(config.theme_file.clone());

        Ok(Self {
            config: Arc::new(config),
            coordinator: SubmissionCoordinator::new(Arc::new(client)),
            theme,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(api::predict_routes())
        .merge(api::submission_routes())
        .merge(api::theme_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
