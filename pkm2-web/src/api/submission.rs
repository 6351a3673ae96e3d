//! Submission status endpoint
//!
//! GET /api/submission reports the coordinator phase and the outcome of the
//! most recent submission (rows, distribution, or the error message).

use axum::{extract::State, routing::get, Json, Router};

use crate::services::SubmissionSnapshot;
use crate::AppState;

/// GET /api/submission
pub async fn get_submission(State(state): State<AppState>) -> Json<SubmissionSnapshot> {
    Json(state.coordinator.snapshot().await)
}

pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/api/submission", get(get_submission))
}
