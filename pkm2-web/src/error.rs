//! Error types for pkm2-web
//!
//! Every failure maps to a JSON body `{"error": {"code", "message"}}`.
//! Validation failures never reach the prediction service; service-side
//! failures surface as 502.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pkm2_common::IngestError;
use serde_json::json;
use thiserror::Error;

use crate::services::{PredictionError, SubmissionError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - a submission is already running
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected during ingestion (415/400/422)
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Prediction service unreachable or failing (502)
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// pkm2-common error
    #[error("Common error: {0}")]
    Common(#[from] pkm2_common::Error),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Busy => ApiError::Conflict(err.to_string()),
            SubmissionError::Rejected(e) => ApiError::Ingest(e),
            SubmissionError::Failed(e) => ApiError::Prediction(e),
            SubmissionError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "SUBMISSION_IN_PROGRESS"),
            ApiError::Ingest(e) => match e {
                IngestError::FileType { .. } => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "FILE_TYPE"),
                IngestError::FileRead(_) => (StatusCode::BAD_REQUEST, "FILE_READ"),
                IngestError::FileParse { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "FILE_PARSE"),
                IngestError::EmptyBatch { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_BATCH"),
                IngestError::BatchTooLarge { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "BATCH_TOO_LARGE")
                }
            },
            ApiError::Prediction(e) => match e {
                PredictionError::Network(_) => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
                PredictionError::Service { .. } => (StatusCode::BAD_GATEWAY, "SERVICE_ERROR"),
                PredictionError::MalformedResponse(_) => {
                    (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
                }
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(e) if e.is_caller_error() => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        }
    }
}

impl ApiError {
    /// User-facing message, without the variant prefix
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            ApiError::Common(e) if e.is_caller_error() => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
