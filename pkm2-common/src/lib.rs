//! # PKM2 Common Library
//!
//! Shared code for the PKM2 classifier service:
//! - Input ingestion (free text and spreadsheet uploads)
//! - Batch validation
//! - Prediction service request/response schema
//! - Result aggregation and distribution counts
//! - Configuration loading

pub mod config;
pub mod error;
pub mod ingest;
pub mod results;

pub use error::{Error, Result};
pub use ingest::{
    normalize_text, parse_upload, validate_batch, IngestError, InputSource, UploadKind,
    ValidatedBatch, MAX_COMPOUNDS,
};
pub use results::{
    aggregate, summarize_distribution, ConfidenceLevel, DistributionCounts, Label,
    PredictionRequest, PredictionResponse, ResultRow,
};
