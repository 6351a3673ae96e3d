//! Batch bounds validation

use serde::Serialize;

use super::IngestError;

/// Maximum number of compounds per prediction request
pub const MAX_COMPOUNDS: usize = 20;

/// Ordered batch of SMILES with `1 <= len <= MAX_COMPOUNDS`.
///
/// Only constructed by [`validate_batch`]; oversize input is rejected, never
/// truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedBatch(Vec<String>);

impl ValidatedBatch {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Enforce non-emptiness and the batch size limit.
///
/// `from_file` only selects the wording of the empty-batch message.
pub fn validate_batch(
    candidates: Vec<String>,
    from_file: bool,
) -> Result<ValidatedBatch, IngestError> {
    if candidates.is_empty() {
        return Err(IngestError::EmptyBatch { from_file });
    }

    if candidates.len() > MAX_COMPOUNDS {
        return Err(IngestError::BatchTooLarge {
            limit: MAX_COMPOUNDS,
            actual: candidates.len(),
        });
    }

    Ok(ValidatedBatch(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{}O", i)).collect()
    }

    #[test]
    fn test_accepts_all_sizes_within_bounds() {
        for n in 1..=MAX_COMPOUNDS {
            let batch = validate_batch(batch_of(n), false).unwrap();
            assert_eq!(batch.len(), n);
            assert_eq!(batch.as_slice(), batch_of(n).as_slice());
        }
    }

    #[test]
    fn test_rejects_empty_with_source_specific_error() {
        assert_eq!(
            validate_batch(Vec::new(), false),
            Err(IngestError::EmptyBatch { from_file: false })
        );
        assert_eq!(
            validate_batch(Vec::new(), true),
            Err(IngestError::EmptyBatch { from_file: true })
        );
    }

    #[test]
    fn test_rejects_oversize_without_truncating() {
        let err = validate_batch(batch_of(21), false).unwrap_err();
        assert_eq!(err, IngestError::BatchTooLarge { limit: 20, actual: 21 });

        let msg = err.to_string();
        assert!(msg.contains("20"));
        assert!(msg.contains("21"));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let batch = validate_batch(vec!["CCO".to_string()], false).unwrap();
        assert_eq!(serde_json::to_string(&batch).unwrap(), r#"["CCO"]"#);
    }
}
