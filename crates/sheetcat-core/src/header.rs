//! Header label normalization and equivalence rules

use std::collections::BTreeSet;

/// Normalize a raw header label into its canonical comparison form.
///
/// Runs of whitespace collapse to a single space, leading and trailing
/// whitespace is trimmed, and the result is lower-cased. A missing label
/// is represented by the empty string and normalizes to the empty string.
pub fn normalize(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalize every label of a header row, preserving order.
pub fn canonical_labels(labels: &[String]) -> Vec<String> {
    labels.iter().map(|l| normalize(l)).collect()
}

/// The set of canonical labels in a header row. Duplicates collapse.
pub fn label_set(labels: &[String]) -> BTreeSet<String> {
    labels.iter().map(|l| normalize(l)).collect()
}

/// Two header rows are equivalent when their canonical label sets are equal.
/// Column order and duplicate multiplicity do not matter.
pub fn equivalent(a: &[String], b: &[String]) -> bool {
    label_set(a) == label_set(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Name"), "name");
        assert_eq!(normalize("  Age  "), "age");
        assert_eq!(normalize("First   Name"), "first name");
        assert_eq!(normalize("UNIT\tPrice"), "unit price");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("\t\n"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["Name", "  First   Name ", "", "ÜBER  kolumne", "a b c"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_equivalent_ignores_order() {
        let a = labels(&["Name", "Age"]);
        let b = labels(&["age ", "NAME"]);
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn test_equivalent_detects_mismatch() {
        let a = labels(&["Name", "Age"]);
        let b = labels(&["Name", "City"]);
        assert!(!equivalent(&a, &b));
    }

    #[test]
    fn test_equivalent_collapses_duplicates() {
        let a = labels(&["Name", "Age"]);
        let b = labels(&["Name", "name ", "Age"]);
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn test_label_set_is_canonical() {
        let set = label_set(&labels(&["  Name ", "AGE"]));
        assert!(set.contains("name"));
        assert!(set.contains("age"));
        assert_eq!(set.len(), 2);
    }
}
