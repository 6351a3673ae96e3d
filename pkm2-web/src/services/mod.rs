//! Services behind the HTTP API

pub mod prediction_client;
pub mod submission;
pub mod theme_store;

pub use prediction_client::{PredictionClient, PredictionError};
pub use submission::{
    PredictionReport, SubmissionCoordinator, SubmissionError, SubmissionOutcome, SubmissionPhase,
    SubmissionSnapshot,
};
pub use theme_store::{Theme, ThemeStore};
