//! Prediction service client
//!
//! POSTs a validated batch to the remote classifier and decodes the reply
//! into the explicit response schema. Three failure kinds are kept apart:
//! no response at all, a non-2xx response, and a 2xx body that does not match
//! the schema.

use pkm2_common::{PredictionRequest, PredictionResponse};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("pkm2-web/", env!("CARGO_PKG_VERSION"));

/// Prediction client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// Request never reached the service or no response arrived
    #[error("Could not reach the prediction service: {0}")]
    Network(String),

    /// Service answered with a non-2xx status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// 2xx body did not match the response schema
    #[error("Prediction service returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// HTTP client for the prediction service
pub struct PredictionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Create a client for `endpoint`; `timeout` of `None` waits indefinitely
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, PredictionError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| PredictionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one batch and decode the classification/regression reply
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            compounds = request.compound.len(),
            confidence = request.percentage.get(),
            "Sending prediction request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| PredictionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PredictionError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = service_error_message(&body)
                .unwrap_or_else(|| format!("Prediction service returned status {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), error = %message, "Prediction service error");
            return Err(PredictionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: PredictionResponse = serde_json::from_slice(&body)
            .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            classified = decoded.classification_results.len(),
            per_compound_errors = decoded.per_compound_errors().len(),
            "Prediction response received"
        );

        Ok(decoded)
    }
}

/// `{"error": "..."}` from a failure body, if present
fn service_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")?
        .as_str()
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}
