//! End-to-end tests of the pure pipeline stages
//!
//! raw input → candidates → ValidatedBatch → request body
//! response body → result rows + distribution counts

use pkm2_common::results::RegressionSummary;
use pkm2_common::{
    aggregate, summarize_distribution, ConfidenceLevel, IngestError, InputSource, Label,
    PredictionRequest, PredictionResponse, MAX_COMPOUNDS,
};
use serde_json::json;

#[test]
fn test_text_and_file_sources_converge() {
    let text = InputSource::Text("CCO\nc1ccccc1\nCC(=O)O".to_string())
        .into_batch()
        .unwrap();
    let file = InputSource::File {
        file_name: "upload.csv".to_string(),
        bytes: b"SMILES\nCCO\nc1ccccc1\nCC(=O)O\n".to_vec(),
    }
    .into_batch()
    .unwrap();

    assert_eq!(text, file);

    let request = PredictionRequest::new(file, ConfidenceLevel::new(95).unwrap());
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({ "compound": ["CCO", "c1ccccc1", "CC(=O)O"], "percentage": 95 })
    );
}

#[test]
fn test_length_floor_applies_to_files_only() {
    let text = InputSource::Text("C\nN".to_string()).into_batch().unwrap();
    assert_eq!(text.len(), 2);

    let file = InputSource::File {
        file_name: "upload.csv".to_string(),
        bytes: b"C\nN\n".to_vec(),
    };
    assert_eq!(
        file.into_batch().unwrap_err(),
        IngestError::EmptyBatch { from_file: true }
    );
}

#[test]
fn test_oversize_file_rejected() {
    let mut csv = String::from("smiles\n");
    for i in 0..=MAX_COMPOUNDS {
        csv.push_str(&format!("CC{}O\n", i));
    }

    let err = InputSource::File {
        file_name: "big.csv".to_string(),
        bytes: csv.into_bytes(),
    }
    .into_batch()
    .unwrap_err();

    assert_eq!(
        err,
        IngestError::BatchTooLarge {
            limit: 20,
            actual: 21
        }
    );
}

#[test]
fn test_empty_text_rejected() {
    let err = InputSource::Text(" \n , ".to_string())
        .into_batch()
        .unwrap_err();
    assert_eq!(err, IngestError::EmptyBatch { from_file: false });
}

#[test]
fn test_response_to_rows_and_counts() {
    let body = r#"{
        "classification_results": {
            "c1ccccc1": "Decoy",
            "CCO": "Activator",
            "EMPTY_INPUT_2": "Error: empty SMILES",
            "CCN": "Inhibitor",
            "CCC": "Unexpected"
        },
        "regression_results": {
            "CCO": {
                "regression_pIC50_median": 5.2,
                "regression_pIC50_lower_bound": 4.8,
                "regression_pIC50_upper_bound": 5.6,
                "confidence_interval_percentage": 95,
                "num_regression_models_used": 3
            }
        },
        "batch_processing_errors": [
            { "input_smiles": "C1CC", "error": "Invalid SMILES" }
        ]
    }"#;
    let response: PredictionResponse = serde_json::from_str(body).unwrap();

    let results = aggregate(&response);
    let labels: Vec<&Label> = results.rows.iter().map(|r| &r.label).collect();
    assert_eq!(
        labels,
        vec![
            &Label::Activator,
            &Label::Inhibitor,
            &Label::Decoy,
            &Label::Error("Error: empty SMILES".to_string()),
            &Label::Unknown("Unexpected".to_string()),
        ]
    );

    let activator = &results.rows[0];
    assert!(matches!(activator.regression, RegressionSummary::Estimate(_)));
    assert!(activator.summary.contains("5.20"));
    assert!(activator.summary.contains("95"));

    assert_eq!(results.errors.len(), 1);
    assert_eq!(results.errors[0].identifier, "C1CC");

    let counts = summarize_distribution(&response.classification_results);
    assert_eq!(
        serde_json::to_value(counts).unwrap(),
        json!({ "Activator": 1, "Inhibitor": 1, "Decoy": 2, "Error": 1 })
    );
}
