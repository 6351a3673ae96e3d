//! Prediction results
//!
//! Explicit schema for the prediction service's request and response, plus the
//! pure derivations used for display:
//! - [`aggregate`]: ordered result rows with regression summaries
//! - [`summarize_distribution`]: per-label counts for the distribution chart
//!
//! Both derivations are recomputed wholesale from a response; neither keeps
//! state between calls.

mod aggregate;
mod distribution;
mod label;
mod schema;

pub use aggregate::{
    aggregate, AggregatedResults, RegressionSummary, ResultRow, EMPTY_INPUT_DISPLAY,
    EMPTY_INPUT_PREFIX,
};
pub use distribution::{summarize_distribution, DistributionCounts};
pub use label::Label;
pub use schema::{
    ConfidenceLevel, PerCompoundError, PotencyMeasure, PredictionRequest, PredictionResponse,
    RegressionEntry, RegressionEstimate,
};
