//! Prediction service wire schema
//!
//! Request: `{ "compound": [..], "percentage": 1..=99 }`
//!
//! Response:
//! ```json
//! {
//!   "classification_results": { "<smiles>": "<label>" },
//!   "regression_results": { "<smiles>": { "regression_pIC50_median": 5.2, ... } | { "error": "..." } },
//!   "batch_processing_errors": [ { "smiles": "...", "error": "..." } ]
//! }
//! ```
//!
//! `classification_results` is required and keeps the server's key order.
//! The other two sections are optional and may be `null`.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::ingest::ValidatedBatch;
use crate::{Error, Result};

/// Confidence interval width in percent, `1..=99`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ConfidenceLevel(u8);

impl ConfidenceLevel {
    pub const DEFAULT: ConfidenceLevel = ConfidenceLevel(95);

    pub fn new(percent: i64) -> Result<Self> {
        if (1..=99).contains(&percent) {
            Ok(ConfidenceLevel(percent as u8))
        } else {
            Err(Error::InvalidInput(format!(
                "Confidence level must be between 1 and 99, got {}",
                percent
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for ConfidenceLevel {
    type Error = Error;

    fn try_from(percent: i64) -> Result<Self> {
        ConfidenceLevel::new(percent)
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub compound: Vec<String>,
    pub percentage: ConfidenceLevel,
}

impl PredictionRequest {
    pub fn new(batch: ValidatedBatch, percentage: ConfidenceLevel) -> Self {
        Self {
            compound: batch.into_inner(),
            percentage,
        }
    }
}

/// Decoded success body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResponse {
    /// `(identifier, raw label)` in server order
    #[serde(deserialize_with = "ordered_labels")]
    pub classification_results: Vec<(String, String)>,

    #[serde(default)]
    pub regression_results: Option<HashMap<String, RegressionEntry>>,

    #[serde(default)]
    pub batch_processing_errors: Option<Vec<PerCompoundError>>,
}

impl PredictionResponse {
    pub fn regression_for(&self, identifier: &str) -> Option<&RegressionEntry> {
        self.regression_results.as_ref()?.get(identifier)
    }

    pub fn per_compound_errors(&self) -> &[PerCompoundError] {
        self.batch_processing_errors.as_deref().unwrap_or(&[])
    }
}

/// Collect a JSON object into an ordered list, stringifying non-string labels.
/// A repeated key keeps its first position and takes the last value.
fn ordered_labels<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LabelsVisitor;

    impl<'de> Visitor<'de> for LabelsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of identifier to classification label")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let capacity = map.size_hint().unwrap_or(0);
            let mut entries: Vec<(String, String)> = Vec::with_capacity(capacity);
            // key -> position in `entries`
            let mut positions: HashMap<String, usize> = HashMap::with_capacity(capacity);

            while let Some((key, value)) = map.next_entry::<String, Value>()? {
                let label = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                match positions.get(&key).copied() {
                    Some(index) => entries[index].1 = label,
                    None => {
                        positions.insert(key.clone(), entries.len());
                        entries.push((key, label));
                    }
                }
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(LabelsVisitor)
}

/// Potency measure carried by a regression entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PotencyMeasure {
    #[serde(rename = "pIC50")]
    PIC50,
    #[serde(rename = "AC50")]
    AC50,
}

impl PotencyMeasure {
    fn field_prefix(self) -> &'static str {
        match self {
            PotencyMeasure::PIC50 => "regression_pIC50",
            PotencyMeasure::AC50 => "regression_AC50",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PotencyMeasure::PIC50 => "pIC50",
            PotencyMeasure::AC50 => "AC50",
        }
    }
}

/// One `regression_results` entry: either an estimate or `{ "error": .. }`.
///
/// Numeric fields are kept loose here; [`RegressionEntry::estimate`] decides
/// whether they are usable so a bad entry only affects its own row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegressionEntry {
    #[serde(default)]
    error: Option<Value>,

    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

/// Usable regression estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionEstimate {
    pub measure: PotencyMeasure,
    pub median: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_used: Option<u64>,
}

impl RegressionEntry {
    /// Server-reported error text, if any
    pub fn error(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Usable estimate, or a description of why there is none
    pub fn estimate(&self) -> std::result::Result<RegressionEstimate, String> {
        if let Some(error) = self.error() {
            return Err(error);
        }

        let measure = [PotencyMeasure::PIC50, PotencyMeasure::AC50]
            .into_iter()
            .find(|m| self.fields.contains_key(&format!("{}_median", m.field_prefix())))
            .ok_or_else(|| "Regression data missing median estimate".to_string())?;

        let prefix = measure.field_prefix();
        let median = self.number(&format!("{}_median", prefix))?;
        let lower_bound = self.number(&format!("{}_lower_bound", prefix))?;
        let upper_bound = self.number(&format!("{}_upper_bound", prefix))?;
        let confidence_level = self.number("confidence_interval_percentage")?;
        let models_used = self
            .fields
            .get("num_regression_models_used")
            .and_then(model_count);

        Ok(RegressionEstimate {
            measure,
            median,
            lower_bound,
            upper_bound,
            confidence_level,
            models_used,
        })
    }

    fn number(&self, key: &str) -> std::result::Result<f64, String> {
        self.fields
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("Regression data incomplete: '{}' missing or not numeric", key))
    }
}

/// Per-identifier failure reported by the service (non-fatal to the batch)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerCompoundError {
    #[serde(
        rename(serialize = "identifier", deserialize = "smiles"),
        alias = "input_smiles",
        default
    )]
    pub identifier: String,

    #[serde(
        rename(serialize = "message", deserialize = "error"),
        default = "unknown_error"
    )]
    pub message: String,
}

fn unknown_error() -> String {
    "Unknown error".to_string()
}

/// Non-negative integer count; whole-number floats such as `3.0` included
fn model_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}
