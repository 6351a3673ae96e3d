//! Label distribution for the results chart

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::label::Label;

/// Per-bucket counts. Serializes as a map with zero-count buckets omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistributionCounts {
    pub activator: usize,
    pub inhibitor: usize,
    pub decoy: usize,
    pub error: usize,
}

impl DistributionCounts {
    /// Non-zero buckets in chart order
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        [
            ("Activator", self.activator),
            ("Inhibitor", self.inhibitor),
            ("Decoy", self.decoy),
            ("Error", self.error),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    pub fn total(&self) -> usize {
        self.activator + self.inhibitor + self.decoy + self.error
    }
}

impl Serialize for DistributionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (label, count) in entries {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

/// Tally classification labels into the four chart buckets.
///
/// Unrecognized labels count as Decoy unless they mention "error", so an
/// unknown label can never inflate the Activator or Inhibitor counts.
pub fn summarize_distribution(classification: &[(String, String)]) -> DistributionCounts {
    let mut counts = DistributionCounts::default();
    for (_, raw) in classification {
        match Label::parse(raw) {
            Label::Activator => counts.activator += 1,
            Label::Inhibitor => counts.inhibitor += 1,
            Label::Decoy | Label::Unknown(_) => counts.decoy += 1,
            Label::Error(_) => counts.error += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_and_error_bucketing() {
        let counts = summarize_distribution(&labels(&[
            ("A", "Activator"),
            ("B", "Activator"),
            ("C", "UnknownLabel"),
            ("D", "WeirdError"),
        ]));

        assert_eq!(
            counts,
            DistributionCounts {
                activator: 2,
                inhibitor: 0,
                decoy: 1,
                error: 1
            }
        );
        assert_eq!(
            serde_json::to_value(counts).unwrap(),
            json!({ "Activator": 2, "Decoy": 1, "Error": 1 })
        );
    }

    #[test]
    fn test_empty_input_serializes_empty_map() {
        let counts = summarize_distribution(&[]);
        assert_eq!(counts.total(), 0);
        assert_eq!(serde_json::to_string(&counts).unwrap(), "{}");
    }

    #[test]
    fn test_total_matches_input_len() {
        let input = labels(&[
            ("A", "Inhibitor"),
            ("B", "Decoy"),
            ("C", "error"),
            ("D", "inhibitor"),
        ]);
        let counts = summarize_distribution(&input);
        assert_eq!(counts.total(), input.len());
        assert_eq!(counts.inhibitor, 1);
        assert_eq!(counts.decoy, 2);
        assert_eq!(counts.error, 1);
    }
}
