use crate::insert_region::{find_insert_regions, InsertRegion};
use crate::overhang_validation::{validate_overhangs, OverhangValidation};
use crate::type2s_enzyme::{analyze_all_enzymes, TypeIisSite};
use crate::ENZYMES;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema tag stamped on every analysis payload. Consumers dispatch on
/// this tag instead of sniffing the payload shape.
pub const ANALYSIS_SCHEMA: &str = "moclo.analysis.v2";

/// Everything derived from one sequence in a single pass: per-enzyme
/// recognition sites, BsaI insert candidates, and a validation verdict
/// over every overhang found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    pub schema: String,
    pub sites: HashMap<String, Vec<TypeIisSite>>,
    pub inserts: Vec<InsertRegion>,
    pub validation: OverhangValidation,
}

impl SequenceAnalysis {
    /// Every site across every enzyme as one list, sorted by position.
    /// Ties keep catalog order, so the result is stable.
    pub fn flattened_sites(&self) -> Vec<TypeIisSite> {
        let mut all: Vec<TypeIisSite> = ENZYMES
            .all()
            .iter()
            .filter_map(|enzyme| self.sites.get(&enzyme.name))
            .flatten()
            .cloned()
            .collect();
        all.sort_by_key(|site| site.position);
        all
    }
}

/// Runs the full catalog against one sequence. Total over any input;
/// an empty sequence yields empty per-enzyme lists and a valid verdict.
pub fn analyze_sequence(sequence: &str) -> SequenceAnalysis {
    let sites = analyze_all_enzymes(sequence);

    // Insert extraction is fixed to BsaI, the workhorse assembly enzyme.
    let inserts = ENZYMES
        .by_name("BsaI")
        .map(|enzyme| find_insert_regions(sequence, enzyme))
        .unwrap_or_default();

    // Overhangs are gathered in catalog order so the verdict wording
    // never depends on map iteration order.
    let overhangs: Vec<String> = ENZYMES
        .all()
        .iter()
        .filter_map(|enzyme| sites.get(&enzyme.name))
        .flatten()
        .map(|site| site.overhang_sequence.clone())
        .collect();
    let validation = validate_overhangs(&overhangs);

    SequenceAnalysis {
        schema: ANALYSIS_SCHEMA.to_string(),
        sites,
        inserts,
        validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_covers_whole_catalog() {
        let analysis = analyze_sequence("GGTCTCAAAATTTTCCCGAGACC");
        assert_eq!(analysis.schema, ANALYSIS_SCHEMA);
        assert_eq!(analysis.sites.len(), ENZYMES.all().len());
        assert_eq!(analysis.sites["BsaI"].len(), 2);
        assert!(analysis.sites["BbsI"].is_empty());
        assert_eq!(analysis.inserts.len(), 1);
    }

    #[test]
    fn test_flattened_sites_sorted_by_position() {
        // BbsI at 3, BsaI at 11; catalog order alone would put BsaI first.
        let analysis = analyze_sequence("AAAGAAGACAAGGTCTCAA");
        let flattened = analysis.flattened_sites();
        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0].enzyme, "BbsI");
        assert_eq!(flattened[0].position, 3);
        assert_eq!(flattened[1].enzyme, "BsaI");
        assert_eq!(flattened[1].position, 11);
    }

    #[test]
    fn test_validation_sees_overhangs_from_all_sites() {
        // Both BsaI sites derive GTCT, which the verdict must flag.
        let analysis = analyze_sequence("GGTCTCAAAATTTTCCCGAGACC");
        assert!(!analysis.validation.valid);
        assert_eq!(
            analysis.validation.conflicts,
            vec!["Duplicate overhang: GTCT"]
        );
    }

    #[test]
    fn test_empty_sequence_analyzes_cleanly() {
        let analysis = analyze_sequence("");
        assert!(analysis.sites.values().all(|sites| sites.is_empty()));
        assert!(analysis.inserts.is_empty());
        assert!(analysis.validation.valid);
    }
}
