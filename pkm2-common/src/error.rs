//! Error type shared by the PKM2 crates
//!
//! Ingestion and prediction failures have their own enums
//! ([`crate::IngestError`], the web crate's `PredictionError`); this one covers
//! configuration, local files and caller-supplied parameters.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading the config or theme file failed
    #[error("File access failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unparseable, or a setting holds an unusable value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Rejected request parameter; the message is shown to the user as is
    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Caused by the caller rather than by this service
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
