//! Ingestion error types

use thiserror::Error;

/// Errors raised while turning raw input into a validated batch.
///
/// All variants are resolved locally: none of them ever reaches the
/// prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// Upload extension is not one of `.csv`, `.xls`, `.xlsx`
    #[error("Unsupported file type for '{file_name}'. Please upload a .csv, .xls or .xlsx file.")]
    FileType { file_name: String },

    /// Upload bytes could not be read from the request
    #[error("Could not read the uploaded file: {0}")]
    FileRead(String),

    /// Primary decoding (and fallback, where applicable) failed
    #[error(
        "Could not parse the uploaded file ({reason}). Please check that the SMILES are in the \
         first column of a valid CSV or Excel file."
    )]
    FileParse { reason: String },

    /// No usable identifiers after normalization or parsing
    #[error("{}", empty_batch_message(.from_file))]
    EmptyBatch { from_file: bool },

    /// More identifiers than a single request may carry
    #[error("Too many compounds: the maximum is {limit} per batch, but {actual} were provided.")]
    BatchTooLarge { limit: usize, actual: usize },
}

fn empty_batch_message(from_file: &bool) -> &'static str {
    if *from_file {
        "No valid SMILES found in the uploaded file. Please check the file format and make sure \
         the SMILES are in the first column."
    } else {
        "Please enter at least one SMILES string or upload a file."
    }
}
