//! Free-text input normalization

/// Split free text into candidate identifiers.
///
/// Pieces are separated by any run of newlines and/or commas, trimmed, and
/// kept in order of appearance. Duplicates are kept. Unlike file-sourced
/// candidates there is no minimum length here.
pub fn normalize_text(text: &str) -> Vec<String> {
    text.split(|c: char| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_newlines_and_commas() {
        let out = normalize_text("CCO\nc1ccccc1,CC(=O)O");
        assert_eq!(out, vec!["CCO", "c1ccccc1", "CC(=O)O"]);
    }

    #[test]
    fn test_runs_of_separators_yield_no_empty_pieces() {
        let out = normalize_text(",,\n\nCCO,\n , \r\nCCN\n,");
        assert_eq!(out, vec!["CCO", "CCN"]);
    }

    #[test]
    fn test_whitespace_only_input_is_empty() {
        assert!(normalize_text("   \n\t ,  ").is_empty());
        assert!(normalize_text("").is_empty());
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        let out = normalize_text("CCO\nCCN\nCCO");
        assert_eq!(out, vec!["CCO", "CCN", "CCO"]);
    }

    #[test]
    fn test_short_pieces_are_kept() {
        // No length floor for typed input
        assert_eq!(normalize_text("C, N"), vec!["C", "N"]);
    }

    #[test]
    fn test_never_emits_blank_candidates() {
        let inputs = [
            " a ,, b \n\n c ",
            "\r\n\r\n",
            ", , ,",
            "x\n \ny",
            "\u{a0}CCO\u{a0}",
        ];
        for input in inputs {
            for piece in normalize_text(input) {
                assert!(!piece.trim().is_empty(), "blank piece from {:?}", input);
            }
        }
    }
}
