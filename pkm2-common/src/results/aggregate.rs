//! Result aggregation
//!
//! Merges classification and regression sections into display rows ordered by
//! label rank. Pure: the same response always yields the same rows.

use serde::Serialize;

use super::label::Label;
use super::schema::{PerCompoundError, PredictionResponse, RegressionEstimate};

/// Key prefix the service uses for empty input slots
pub const EMPTY_INPUT_PREFIX: &str = "EMPTY_INPUT_";

/// Identifier shown for placeholder keys
pub const EMPTY_INPUT_DISPLAY: &str = "(empty input)";

/// Regression outcome for one row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegressionSummary {
    /// Label is not Activator; no regression expected
    NotApplicable,
    /// Usable estimate
    Estimate(RegressionEstimate),
    /// Activator without usable regression data; shown inline in the row
    Unavailable { message: String },
}

impl RegressionSummary {
    /// One-line text for the results table
    pub fn display_text(&self) -> String {
        match self {
            RegressionSummary::NotApplicable => String::new(),
            RegressionSummary::Unavailable { message } => message.clone(),
            RegressionSummary::Estimate(estimate) => {
                let mut text = format!(
                    "{} median {:.2} ({}% CI: {:.2} - {:.2})",
                    estimate.measure.as_str(),
                    estimate.median,
                    format_percentage(estimate.confidence_level),
                    estimate.lower_bound,
                    estimate.upper_bound,
                );
                if let Some(models) = estimate.models_used {
                    text.push_str(&format!(", {} models", models));
                }
                text
            }
        }
    }
}

fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Display-ready result row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Key as returned by the service
    pub key: String,
    /// Human-facing identifier (placeholder keys mapped to a fixed label)
    pub identifier: String,
    pub label: Label,
    pub regression: RegressionSummary,
    /// `regression` rendered as text; empty when not applicable
    pub summary: String,
}

/// Aggregator output: ordered rows plus the untouched per-compound errors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResults {
    pub rows: Vec<ResultRow>,
    pub errors: Vec<PerCompoundError>,
}

fn display_identifier(key: &str) -> String {
    if key.starts_with(EMPTY_INPUT_PREFIX) {
        EMPTY_INPUT_DISPLAY.to_string()
    } else {
        key.to_string()
    }
}

fn regression_summary(response: &PredictionResponse, key: &str, label: &Label) -> RegressionSummary {
    if *label != Label::Activator {
        return RegressionSummary::NotApplicable;
    }

    match response.regression_for(key) {
        None => RegressionSummary::Unavailable {
            message: "Regression data unavailable".to_string(),
        },
        Some(entry) => match entry.estimate() {
            Ok(estimate) => RegressionSummary::Estimate(estimate),
            Err(message) => RegressionSummary::Unavailable { message },
        },
    }
}

/// Build ordered result rows from a decoded response.
///
/// Rows are stably sorted by label rank, so ties keep the server's key order.
pub fn aggregate(response: &PredictionResponse) -> AggregatedResults {
    let mut rows: Vec<ResultRow> = response
        .classification_results
        .iter()
        .map(|(key, raw_label)| {
            let label = Label::parse(raw_label);
            let regression = regression_summary(response, key, &label);
            ResultRow {
                key: key.clone(),
                identifier: display_identifier(key),
                summary: regression.display_text(),
                label,
                regression,
            }
        })
        .collect();

    rows.sort_by_key(|row| row.label.rank());

    AggregatedResults {
        rows,
        errors: response.per_compound_errors().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> PredictionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_activator_with_estimate_and_decoy() {
        let resp = response(json!({
            "classification_results": { "CCO": "Activator", "c1ccccc1": "Decoy" },
            "regression_results": {
                "CCO": {
                    "regression_pIC50_median": 5.2,
                    "regression_pIC50_lower_bound": 4.8,
                    "regression_pIC50_upper_bound": 5.6,
                    "confidence_interval_percentage": 95,
                    "num_regression_models_used": 3
                }
            }
        }));

        let out = aggregate(&resp);
        assert_eq!(out.rows.len(), 2);

        assert_eq!(out.rows[0].identifier, "CCO");
        assert_eq!(out.rows[0].label, Label::Activator);
        assert_eq!(
            out.rows[0].summary,
            "pIC50 median 5.20 (95% CI: 4.80 - 5.60), 3 models"
        );

        assert_eq!(out.rows[1].identifier, "c1ccccc1");
        assert_eq!(out.rows[1].label, Label::Decoy);
        assert_eq!(out.rows[1].regression, RegressionSummary::NotApplicable);
        assert_eq!(out.rows[1].summary, "");
    }

    #[test]
    fn test_sorted_by_rank_with_stable_ties() {
        let resp = response(json!({
            "classification_results": {
                "D1": "Decoy",
                "X1": "Mystery",
                "E1": "Error: bad input",
                "I1": "Inhibitor",
                "D2": "Decoy",
                "A1": "Activator",
                "I2": "Inhibitor"
            }
        }));

        let keys: Vec<String> = aggregate(&resp).rows.into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["A1", "I1", "I2", "D1", "D2", "E1", "X1"]);
    }

    #[test]
    fn test_placeholder_keys_mapped() {
        let resp = response(json!({
            "classification_results": { "EMPTY_INPUT_0": "Error: empty input", "CCO": "Decoy" }
        }));

        let out = aggregate(&resp);
        assert_eq!(out.rows[1].key, "EMPTY_INPUT_0");
        assert_eq!(out.rows[1].identifier, EMPTY_INPUT_DISPLAY);
    }

    #[test]
    fn test_activator_regression_error_and_missing() {
        let resp = response(json!({
            "classification_results": { "A": "Activator", "B": "Activator" },
            "regression_results": { "A": { "error": "model unavailable" } }
        }));

        let out = aggregate(&resp);
        assert_eq!(out.rows[0].summary, "model unavailable");
        assert!(matches!(
            out.rows[1].regression,
            RegressionSummary::Unavailable { .. }
        ));
        assert_eq!(out.rows[1].summary, "Regression data unavailable");
    }

    #[test]
    fn test_regression_for_non_activator_ignored() {
        let resp = response(json!({
            "classification_results": { "A": "Inhibitor" },
            "regression_results": { "A": { "error": "should not show" } }
        }));

        let out = aggregate(&resp);
        assert_eq!(out.rows[0].regression, RegressionSummary::NotApplicable);
    }

    #[test]
    fn test_errors_passed_through() {
        let resp = response(json!({
            "classification_results": { "CCO": "Decoy" },
            "batch_processing_errors": [{ "smiles": "C1CC", "error": "unclosed ring" }]
        }));

        let out = aggregate(&resp);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].identifier, "C1CC");
        assert!(out.rows.iter().all(|r| r.key != "C1CC"));
    }

    #[test]
    fn test_fractional_confidence_level_kept() {
        let resp = response(json!({
            "classification_results": { "A": "Activator" },
            "regression_results": { "A": {
                "regression_AC50_median": 1.234,
                "regression_AC50_lower_bound": 1.0,
                "regression_AC50_upper_bound": 1.5,
                "confidence_interval_percentage": 97.5
            } }
        }));

        assert_eq!(
            aggregate(&resp).rows[0].summary,
            "AC50 median 1.23 (97.5% CI: 1.00 - 1.50)"
        );
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let resp = response(json!({
            "classification_results": { "B": "Decoy", "A": "Activator", "C": "Inhibitor" },
            "regression_results": { "A": {
                "regression_pIC50_median": 6.0,
                "regression_pIC50_lower_bound": 5.5,
                "regression_pIC50_upper_bound": 6.5,
                "confidence_interval_percentage": 90
            } }
        }));

        let first = serde_json::to_string(&aggregate(&resp)).unwrap();
        let second = serde_json::to_string(&aggregate(&resp)).unwrap();
        assert_eq!(first, second);
    }
}
