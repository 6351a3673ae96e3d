//! Theme preference endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::services::Theme;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

/// GET /api/theme
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.theme.current().await,
    })
}

/// POST /api/theme/toggle
///
/// Flips dark/light and persists the new value.
pub async fn toggle_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    let theme = state.theme.toggle().await;
    tracing::debug!(?theme, "Theme toggled");
    Json(ThemeResponse { theme })
}

pub fn theme_routes() -> Router<AppState> {
    Router::new()
        .route("/api/theme", get(get_theme))
        .route("/api/theme/toggle", post(toggle_theme))
}
