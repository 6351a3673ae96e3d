//! Prediction submission endpoints
//!
//! POST /api/predict/text, POST /api/predict/upload
//!
//! Both endpoints run the full pipeline synchronously from the caller's point
//! of view and return the display-ready report. Only one submission may be in
//! flight; a concurrent request receives 409. Requests refused before the
//! pipeline starts (unreadable body, bad confidence level) are still recorded
//! as rejected submissions.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use pkm2_common::{ConfidenceLevel, IngestError, InputSource};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    services::PredictionReport,
    AppState,
};

/// POST /api/predict/text request
#[derive(Debug, Deserialize)]
pub struct TextPredictionRequest {
    /// Newline or comma separated SMILES
    pub text: String,
    /// Confidence level 1-99; the configured default when absent
    #[serde(default)]
    pub percentage: Option<i64>,
}

/// POST /api/predict/text
pub async fn predict_text(
    State(state): State<AppState>,
    payload: Result<Json<TextPredictionRequest>, JsonRejection>,
) -> ApiResult<Json<PredictionReport>> {
    let prepared = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))
        .and_then(|Json(request)| {
            let confidence = resolve_confidence(&state, request.percentage)?;
            Ok((InputSource::Text(request.text), confidence))
        });
    let (source, confidence) = record_rejection(&state, prepared).await?;

    let report = state.coordinator.submit(source, confidence).await?;
    Ok(Json(report))
}

/// POST /api/predict/upload
///
/// Multipart form with a `file` part (.csv, .xls or .xlsx) and an optional
/// `percentage` part.
pub async fn predict_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PredictionReport>> {
    let prepared = match multipart {
        Ok(multipart) => read_upload_form(&state, multipart).await,
        Err(e) => Err(ApiError::BadRequest(format!(
            "Expected a multipart form: {}",
            e.body_text()
        ))),
    };
    let (source, confidence) = record_rejection(&state, prepared).await?;

    let report = state.coordinator.submit(source, confidence).await?;
    Ok(Json(report))
}

async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> ApiResult<(InputSource, ConfidenceLevel)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut percentage: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(ApiError::BadRequest(
                        "Only one file may be uploaded per submission".to_string(),
                    ));
                }
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| {
                        ApiError::BadRequest("Uploaded file has no file name".to_string())
                    })?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| IngestError::FileRead(e.to_string()))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "percentage" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable percentage: {}", e)))?;
                let value = raw.trim().parse::<i64>().map_err(|_| {
                    ApiError::Common(pkm2_common::Error::InvalidInput(format!(
                        "Confidence level must be an integer, got '{}'",
                        raw.trim()
                    )))
                })?;
                percentage = Some(value);
            }
            other => {
                return Err(ApiError::BadRequest(format!(
                    "Unexpected form field '{}': submit either text or a file, not both",
                    other
                )));
            }
        }
    }

    let (file_name, bytes) = upload
        .ok_or_else(|| ApiError::BadRequest("Missing 'file' form field".to_string()))?;
    let confidence = resolve_confidence(state, percentage)?;

    tracing::debug!(file_name = %file_name, size = bytes.len(), "Upload received");
    Ok((InputSource::File { file_name, bytes }, confidence))
}

fn resolve_confidence(state: &AppState, percentage: Option<i64>) -> ApiResult<ConfidenceLevel> {
    match percentage {
        Some(value) => Ok(ConfidenceLevel::new(value)?),
        None => Ok(state.config.default_confidence),
    }
}

/// Store a pre-pipeline failure as the latest submission outcome
async fn record_rejection<T>(state: &AppState, prepared: ApiResult<T>) -> ApiResult<T> {
    if let Err(e) = &prepared {
        state.coordinator.reject(e.message()).await;
    }
    prepared
}

pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/api/predict/text", post(predict_text))
        .route("/api/predict/upload", post(predict_upload))
}
