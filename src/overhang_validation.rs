use crate::FACILITY;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Verdict over a set of overhangs gathered across sites or parts.
/// Duplicates invalidate the set; palindromes and extreme GC content
/// only warn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverhangValidation {
    pub valid: bool,
    pub conflicts: Vec<String>,
    pub warnings: Vec<String>,
}

/// Total function: any input, including the empty list, yields a result.
/// A value appearing n times yields n-1 duplicate conflicts. Every
/// occurrence is checked independently for palindromes and GC content,
/// and all palindrome warnings land before any GC warning.
pub fn validate_overhangs(overhangs: &[String]) -> OverhangValidation {
    let mut conflicts = vec![];
    let mut warnings = vec![];

    let mut seen: HashSet<&str> = HashSet::new();
    for overhang in overhangs {
        if !seen.insert(overhang) {
            conflicts.push(format!("Duplicate overhang: {overhang}"));
        }
    }

    for overhang in overhangs {
        if FACILITY.is_palindromic(overhang) {
            warnings.push(format!(
                "Palindromic overhang: {overhang} (may cause multiple assembly products)"
            ));
        }
    }

    for overhang in overhangs {
        let gc = FACILITY.gc_fraction(overhang);
        if !overhang.is_empty() && !(0.25..=0.75).contains(&gc) {
            warnings.push(format!(
                "Overhang {overhang} has extreme GC content ({:.1}%)",
                gc * 100.0
            ));
        }
    }

    OverhangValidation {
        valid: conflicts.is_empty(),
        conflicts,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overhangs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_duplicates_invalidate() {
        let result = validate_overhangs(&overhangs(&["AATT", "AATT", "GCGC"]));
        assert!(!result.valid);
        assert_eq!(result.conflicts, vec!["Duplicate overhang: AATT"]);
        assert!(
            result
                .warnings
                .contains(&"Palindromic overhang: AATT (may cause multiple assembly products)".to_string())
        );
    }

    #[test]
    fn test_triple_use_yields_two_conflicts() {
        let result = validate_overhangs(&overhangs(&["AATG", "AATG", "AATG"]));
        assert_eq!(result.conflicts.len(), 2);
        assert!(!result.valid);
    }

    #[test]
    fn test_gc_content_boundaries() {
        let low = validate_overhangs(&overhangs(&["AAAA"]));
        assert!(
            low.warnings
                .contains(&"Overhang AAAA has extreme GC content (0.0%)".to_string())
        );

        let high = validate_overhangs(&overhangs(&["GGGG"]));
        assert!(
            high.warnings
                .contains(&"Overhang GGGG has extreme GC content (100.0%)".to_string())
        );

        let balanced = validate_overhangs(&overhangs(&["ATGC"]));
        assert!(
            !balanced
                .warnings
                .iter()
                .any(|warning| warning.contains("GC content"))
        );
    }

    #[test]
    fn test_palindrome_warnings_precede_gc_warnings() {
        // GGGG only trips the GC check, AATT trips both; the palindrome
        // pass runs to completion before the GC pass starts.
        let result = validate_overhangs(&overhangs(&["GGGG", "AATT"]));
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![
                "Palindromic overhang: AATT (may cause multiple assembly products)",
                "Overhang GGGG has extreme GC content (100.0%)",
                "Overhang AATT has extreme GC content (0.0%)",
            ]
        );
    }

    #[test]
    fn test_exact_quarter_gc_is_tolerated() {
        // 25% and 75% sit on the boundary and do not warn.
        let result = validate_overhangs(&overhangs(&["AATG", "GGCT"]));
        assert!(!result.warnings.iter().any(|w| w.contains("GC content")));
    }

    #[test]
    fn test_empty_input() {
        let result = validate_overhangs(&[]);
        assert!(result.valid);
        assert!(result.conflicts.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validation_is_pure() {
        let input = overhangs(&["AATT", "GGCC", "AATT", "TTTT"]);
        assert_eq!(validate_overhangs(&input), validate_overhangs(&input));
    }
}
