//! Classification labels

use serde::{Serialize, Serializer};
use std::fmt;

/// Classification label as reported by the prediction service.
///
/// The closed set is matched exactly (case-sensitive). Anything else is kept
/// verbatim and classed as an error label when it mentions "error".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Activator,
    Inhibitor,
    Decoy,
    /// Service-side failure label, e.g. "Error: invalid SMILES"
    Error(String),
    /// Unrecognized label
    Unknown(String),
}

impl Label {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Activator" => Label::Activator,
            "Inhibitor" => Label::Inhibitor,
            "Decoy" => Label::Decoy,
            other if other.to_lowercase().contains("error") => Label::Error(other.to_string()),
            other => Label::Unknown(other.to_string()),
        }
    }

    /// Display order: Activator < Inhibitor < Decoy < Error < unknown
    pub fn rank(&self) -> u8 {
        match self {
            Label::Activator => 1,
            Label::Inhibitor => 2,
            Label::Decoy => 3,
            Label::Error(_) => 4,
            Label::Unknown(_) => 5,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Activator => "Activator",
            Label::Inhibitor => "Inhibitor",
            Label::Decoy => "Decoy",
            Label::Error(raw) | Label::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_set_exactly() {
        assert_eq!(Label::parse("Activator"), Label::Activator);
        assert_eq!(Label::parse("Inhibitor"), Label::Inhibitor);
        assert_eq!(Label::parse("Decoy"), Label::Decoy);
        assert_eq!(Label::parse("activator"), Label::Unknown("activator".to_string()));
    }

    #[test]
    fn test_error_labels_detected_case_insensitively() {
        assert_eq!(
            Label::parse("Processing ERROR"),
            Label::Error("Processing ERROR".to_string())
        );
        assert_eq!(Label::parse("WeirdError").rank(), 4);
    }

    #[test]
    fn test_rank_order() {
        let ranks: Vec<u8> = ["Activator", "Inhibitor", "Decoy", "Error: bad", "Mystery"]
            .iter()
            .map(|raw| Label::parse(raw).rank())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_serializes_verbatim() {
        assert_eq!(serde_json::to_string(&Label::Decoy).unwrap(), r#""Decoy""#);
        assert_eq!(
            serde_json::to_string(&Label::parse("Mystery")).unwrap(),
            r#""Mystery""#
        );
    }
}
