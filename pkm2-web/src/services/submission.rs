//! Submission coordinator
//!
//! Drives one submission through the pipeline:
//!
//! ```text
//! Idle → Validating ─┬─► Rejected  → Idle
//!                    └─► Submitting ─┬─► Failed    → Idle
//!                                    └─► Succeeded → Idle
//! ```
//!
//! Only one submission may be in flight. Starting a submission clears the
//! previous outcome immediately. The snapshot is replaced wholesale on every
//! transition, never patched.

use chrono::{DateTime, Utc};
use pkm2_common::results::PerCompoundError;
use pkm2_common::{
    aggregate, summarize_distribution, ConfidenceLevel, DistributionCounts, IngestError,
    InputSource, PredictionRequest, ResultRow, ValidatedBatch,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::prediction_client::{PredictionClient, PredictionError};

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
}

/// How the last submission ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Input rejected locally; nothing was sent
    Rejected { message: String },
    /// Network or service failure; replaces any prior results
    Failed { message: String },
    Succeeded { report: PredictionReport },
}

/// Display-ready results of one successful submission
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub submission_id: Uuid,
    pub confidence: ConfidenceLevel,
    pub rows: Vec<ResultRow>,
    pub distribution: DistributionCounts,
    pub batch_processing_errors: Vec<PerCompoundError>,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Immutable view of the coordinator state
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSnapshot {
    pub phase: SubmissionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmissionOutcome>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionSnapshot {
    fn idle() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            submission_id: None,
            outcome: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    Busy,

    #[error(transparent)]
    Rejected(#[from] IngestError),

    #[error(transparent)]
    Failed(#[from] PredictionError),

    #[error("Submission task failed: {0}")]
    Internal(String),
}

/// Owns the submission snapshot and the prediction client
#[derive(Clone)]
pub struct SubmissionCoordinator {
    client: Arc<PredictionClient>,
    snapshot: Arc<RwLock<SubmissionSnapshot>>,
}

impl SubmissionCoordinator {
    pub fn new(client: Arc<PredictionClient>) -> Self {
        Self {
            client,
            snapshot: Arc::new(RwLock::new(SubmissionSnapshot::idle())),
        }
    }

    pub async fn snapshot(&self) -> SubmissionSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Run one submission to completion.
    ///
    /// The work runs in its own task; a dropped HTTP connection does not
    /// interrupt it.
    pub async fn submit(
        &self,
        source: InputSource,
        confidence: ConfidenceLevel,
    ) -> Result<PredictionReport, SubmissionError> {
        let submission_id = self.begin().await?;

        tracing::info!(
            submission_id = %submission_id,
            from_file = source.is_file(),
            confidence = confidence.get(),
            "Submission started"
        );

        let coordinator = self.clone();
        let task = tokio::spawn(async move {
            coordinator.run(submission_id, source, confidence).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Submission task aborted: {}", e);
                self.finish(submission_id, SubmissionOutcome::Failed {
                    message: message.clone(),
                })
                .await;
                Err(SubmissionError::Internal(message))
            }
        }
    }

    /// Record a submission refused before its input could be decoded
    /// (bad confidence level, unreadable form body).
    ///
    /// Replaces any previous outcome. Ignored while another submission is in
    /// flight; returns whether the rejection was recorded.
    pub async fn reject(&self, message: impl Into<String>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.phase != SubmissionPhase::Idle {
            return false;
        }

        let submission_id = Uuid::new_v4();
        let message = message.into();
        tracing::info!(submission_id = %submission_id, error = %message, "Submission rejected");
        *snapshot = SubmissionSnapshot {
            phase: SubmissionPhase::Idle,
            submission_id: Some(submission_id),
            outcome: Some(SubmissionOutcome::Rejected { message }),
            updated_at: Utc::now(),
        };
        true
    }

    /// Idle → Validating, clearing the previous outcome
    async fn begin(&self) -> Result<Uuid, SubmissionError> {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.phase != SubmissionPhase::Idle {
            return Err(SubmissionError::Busy);
        }

        let submission_id = Uuid::new_v4();
        *snapshot = SubmissionSnapshot {
            phase: SubmissionPhase::Validating,
            submission_id: Some(submission_id),
            outcome: None,
            updated_at: Utc::now(),
        };
        Ok(submission_id)
    }

    async fn run(
        &self,
        submission_id: Uuid,
        source: InputSource,
        confidence: ConfidenceLevel,
    ) -> Result<PredictionReport, SubmissionError> {
        let batch = match validate(source).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::info!(submission_id = %submission_id, error = %e, "Submission rejected");
                self.finish(submission_id, SubmissionOutcome::Rejected {
                    message: e.to_string(),
                })
                .await;
                return Err(e);
            }
        };

        self.transition(submission_id, SubmissionPhase::Submitting).await;
        let submitted_at = Utc::now();
        tracing::info!(
            submission_id = %submission_id,
            compounds = batch.len(),
            endpoint = %self.client.endpoint(),
            "Submitting batch"
        );

        let request = PredictionRequest::new(batch, confidence);
        let response = match self.client.predict(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(submission_id = %submission_id, error = %e, "Prediction failed");
                self.finish(submission_id, SubmissionOutcome::Failed {
                    message: e.to_string(),
                })
                .await;
                return Err(e.into());
            }
        };

        let results = aggregate(&response);
        let report = PredictionReport {
            submission_id,
            confidence,
            rows: results.rows,
            distribution: summarize_distribution(&response.classification_results),
            batch_processing_errors: results.errors,
            submitted_at,
            completed_at: Utc::now(),
        };

        tracing::info!(
            submission_id = %submission_id,
            rows = report.rows.len(),
            errors = report.batch_processing_errors.len(),
            "Submission succeeded"
        );

        self.finish(submission_id, SubmissionOutcome::Succeeded {
            report: report.clone(),
        })
        .await;
        Ok(report)
    }

    async fn transition(&self, submission_id: Uuid, phase: SubmissionPhase) {
        *self.snapshot.write().await = SubmissionSnapshot {
            phase,
            submission_id: Some(submission_id),
            outcome: None,
            updated_at: Utc::now(),
        };
    }

    /// Back to Idle with the given outcome
    async fn finish(&self, submission_id: Uuid, outcome: SubmissionOutcome) {
        *self.snapshot.write().await = SubmissionSnapshot {
            phase: SubmissionPhase::Idle,
            submission_id: Some(submission_id),
            outcome: Some(outcome),
            updated_at: Utc::now(),
        };
    }
}

/// Normalize/parse on the blocking pool
async fn validate(source: InputSource) -> Result<ValidatedBatch, SubmissionError> {
    tokio::task::spawn_blocking(move || source.into_batch())
        .await
        .map_err(|e| SubmissionError::Internal(format!("Input decoding aborted: {}", e)))?
        .map_err(SubmissionError::from)
}
