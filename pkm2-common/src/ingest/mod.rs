//! Batch ingestion
//!
//! Turns raw user input into a validated, size-bounded batch of SMILES:
//!
//! ```text
//! InputSource::Text ─► normalize_text ─┐
//!                                      ├─► validate_batch ─► ValidatedBatch
//! InputSource::File ─► parse_upload ───┘
//! ```
//!
//! Both entry points emit the same shape (ordered, undeduplicated strings) so
//! they converge on a single validator.

mod error;
mod tabular;
mod text;
mod validator;

pub use error::IngestError;
pub use tabular::{parse_upload, UploadKind};
pub use text::normalize_text;
pub use validator::{validate_batch, ValidatedBatch, MAX_COMPOUNDS};

/// Raw input for one submission.
///
/// Exactly one source is active per submission; selecting a file replaces any
/// typed text and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Free text typed by the user (newline or comma separated)
    Text(String),
    /// Uploaded spreadsheet or CSV file
    File { file_name: String, bytes: Vec<u8> },
}

impl InputSource {
    /// Whether the input came from an uploaded file (affects error wording only)
    pub fn is_file(&self) -> bool {
        matches!(self, InputSource::File { .. })
    }

    /// Extract candidate identifiers without validating batch bounds
    pub fn candidates(&self) -> Result<Vec<String>, IngestError> {
        match self {
            InputSource::Text(text) => Ok(normalize_text(text)),
            InputSource::File { file_name, bytes } => parse_upload(file_name, bytes),
        }
    }

    /// Normalize or parse the input and validate the resulting batch
    pub fn into_batch(self) -> Result<ValidatedBatch, IngestError> {
        let from_file = self.is_file();
        let candidates = self.candidates()?;
        validate_batch(candidates, from_file)
    }
}
