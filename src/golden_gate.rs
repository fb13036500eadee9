use crate::moclo_standard::OverhangPair;
use crate::part::Part;
use crate::type2s_enzyme::TypeIisSite;
use crate::{FACILITY, MOCLO_STANDARD};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stands in for a fusion site when a part has too few recognition
/// sites to derive real ones.
pub const FALLBACK_OVERHANG: &str = "NNNN";

/// Enzyme assumed for assembly reactions when the caller names none.
pub const DEFAULT_ASSEMBLY_ENZYME: &str = "BsaI";

/// Role a part plays inside an assembly, normalized from the free-form
/// declared type on the library record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Promoter,
    Cds,
    Terminator,
    Backbone,
    Connector,
    Other,
}

impl PartType {
    /// Collapses declared-type synonyms onto the canonical role.
    /// Anything unrecognized becomes `Other`.
    pub fn from_declared(declared: &str) -> Self {
        match declared.to_lowercase().as_str() {
            "promoter" => PartType::Promoter,
            "cds" | "coding_sequence" => PartType::Cds,
            "terminator" => PartType::Terminator,
            "backbone" | "vector" => PartType::Backbone,
            "connector" => PartType::Connector,
            _ => PartType::Other,
        }
    }

    /// Rank in the suggested assembly order. The backbone leads,
    /// unrecognized parts trail.
    pub fn assembly_priority(self) -> u8 {
        match self {
            PartType::Backbone => 0,
            PartType::Promoter => 1,
            PartType::Cds => 2,
            PartType::Terminator => 3,
            PartType::Connector => 4,
            PartType::Other => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Efficiency {
    High,
    Medium,
    Low,
}

impl Efficiency {
    /// Expected fraction of correct ligation products in a one-pot
    /// reaction at this tier.
    pub fn reaction_rate(self) -> f64 {
        match self {
            Efficiency::High => 0.9,
            Efficiency::Medium => 0.7,
            Efficiency::Low => 0.4,
        }
    }
}

impl fmt::Display for Efficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Efficiency::High => "high",
            Efficiency::Medium => "medium",
            Efficiency::Low => "low",
        };
        write!(f, "{text}")
    }
}

/// A library part projected into assembly terms: normalized role and
/// the fusion sites its outermost recognition sites produce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldenGatePart {
    pub id: String,
    pub name: String,
    pub part_type: PartType,
    pub level: u8,
    pub left_overhang: String,
    pub right_overhang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    pub compatible: bool,
    pub position: usize,
}

/// Full assembly plan for one part set. Recomputed wholesale on each
/// call; never stored or updated incrementally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldenGateStrategy {
    pub level: u8,
    pub parts: Vec<GoldenGatePart>,
    pub backbone: GoldenGatePart,
    pub assembly_order: Vec<String>,
    pub warnings: Vec<String>,
    pub conflicts: Vec<String>,
    pub efficiency: Efficiency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedProduct {
    pub size: usize,
    pub overhangs: Vec<String>,
    pub circularized: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssemblyReaction {
    pub enzyme: String,
    pub parts: Vec<GoldenGatePart>,
    pub expected_product: ExpectedProduct,
    pub efficiency: f64,
    pub warnings: Vec<String>,
}

/// Builds the assembly strategy for a set of library parts: inferred
/// level, backbone choice, derived overhangs, junction conflicts,
/// suggested order and an efficiency tier. Total over any input; an
/// empty part list yields an empty strategy around the default
/// backbone.
pub fn analyze_part_compatibility(parts: &[Part]) -> GoldenGateStrategy {
    let converted: Vec<GoldenGatePart> = parts.iter().map(convert_part).collect();
    let (conflicts, warnings) = analyze_overhang_compatibility(&converted);
    let mut strategy = GoldenGateStrategy {
        level: determine_best_level(parts),
        parts: converted,
        backbone: find_best_backbone(parts),
        assembly_order: vec![],
        warnings,
        conflicts,
        efficiency: Efficiency::Medium,
    };
    strategy.assembly_order = assign_assembly_order(&mut strategy.parts);
    strategy.efficiency = assembly_efficiency(&strategy);
    strategy
}

/// Level 0 assembles basic parts, level 1 assembles transcription
/// units, everything else is treated as a higher-order assembly.
/// Declared types are compared verbatim here, before normalization.
fn determine_best_level(parts: &[Part]) -> u8 {
    let has_basic_parts = parts
        .iter()
        .any(|part| matches!(part.part_type.as_str(), "promoter" | "cds" | "terminator"));
    let has_transcription_units = parts
        .iter()
        .any(|part| part.part_type == "transcription_unit");

    if has_basic_parts && !has_transcription_units {
        0
    } else if has_transcription_units {
        1
    } else {
        2
    }
}

/// Picks the first part that looks like a vector: declared backbone
/// type, a resistance or origin marker, or a telltale name. Falls back
/// to a synthetic backbone so downstream steps always have one.
fn find_best_backbone(parts: &[Part]) -> GoldenGatePart {
    let candidate = parts.iter().find(|part| {
        let name = part.name.to_lowercase();
        part.part_type == "backbone"
            || part.resistance.as_deref().is_some_and(|r| !r.is_empty())
            || part.origin.as_deref().is_some_and(|o| !o.is_empty())
            || name.contains("vector")
            || name.contains("backbone")
    });

    match candidate {
        Some(part) => convert_part(part),
        None => GoldenGatePart {
            id: "default_backbone".to_string(),
            name: "Default Backbone".to_string(),
            part_type: PartType::Backbone,
            level: 0,
            left_overhang: "CGCT".to_string(),
            right_overhang: "GGAG".to_string(),
            sequence: None,
            compatible: true,
            position: 0,
        },
    }
}

fn convert_part(part: &Part) -> GoldenGatePart {
    let (left, right) = derive_overhangs(&part.sites);
    let compatible = left != right && left.len() == 4;
    GoldenGatePart {
        id: part.id.clone(),
        name: part.name.clone(),
        part_type: PartType::from_declared(&part.part_type),
        level: part.level,
        left_overhang: left,
        right_overhang: right,
        sequence: Some(part.sequence.clone()),
        compatible,
        position: 0,
    }
}

/// Left and right fusion sites of a part, read from its outermost
/// recognition sites. Fewer than two sites yields the sentinel on both
/// ends.
pub fn derive_overhangs(sites: &[TypeIisSite]) -> (String, String) {
    if sites.len() < 2 {
        return (FALLBACK_OVERHANG.to_string(), FALLBACK_OVERHANG.to_string());
    }
    let mut sorted: Vec<&TypeIisSite> = sites.iter().collect();
    sorted.sort_by_key(|site| site.position);
    (
        sorted[0].overhang_sequence.clone(),
        sorted[sorted.len() - 1].overhang_sequence.clone(),
    )
}

/// A junction overhang pairs one right end with one left end. Anything
/// used more than twice, or twice on the same side, cannot ligate
/// uniquely and is a conflict. Palindromes and known bad pairings only
/// warn.
fn analyze_overhang_compatibility(parts: &[GoldenGatePart]) -> (Vec<String>, Vec<String>) {
    let mut conflicts = vec![];
    let mut warnings = vec![];

    // Usage counts, keyed in first-seen order so messages are stable.
    let mut order: Vec<&str> = vec![];
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for part in parts {
        for overhang in [part.left_overhang.as_str(), part.right_overhang.as_str()] {
            if !counts.contains_key(overhang) {
                order.push(overhang);
            }
            *counts.entry(overhang).or_insert(0) += 1;
        }
    }

    for overhang in &order {
        let count = counts[overhang];
        if count > 2 {
            conflicts.push(format!(
                "Overhang {overhang} used {count} times - will cause assembly conflicts"
            ));
        } else if count == 2 {
            let left_usage = parts.iter().filter(|p| p.left_overhang == *overhang).count();
            let right_usage = parts.iter().filter(|p| p.right_overhang == *overhang).count();
            if left_usage == 2 || right_usage == 2 {
                conflicts.push(format!("Overhang {overhang} used twice on the same side"));
            }
        }
    }

    for overhang in &order {
        if FACILITY.is_palindromic(overhang) {
            warnings.push(format!(
                "Overhang {overhang} is palindromic - may reduce assembly efficiency"
            ));
        }
    }

    for pair in MOCLO_STANDARD.problematic_pairs() {
        let [first, second] = pair;
        if counts.contains_key(first.as_str()) && counts.contains_key(second.as_str()) {
            warnings.push(format!(
                "Overhangs {first} and {second} may have reduced ligation efficiency"
            ));
        }
    }

    (conflicts, warnings)
}

/// Ranks parts by role priority, writes the resulting slot back onto
/// each part's `position`, and returns ids in suggested order. The
/// sort is stable, so ties keep input order.
fn assign_assembly_order(parts: &mut [GoldenGatePart]) -> Vec<String> {
    let mut ranked: Vec<usize> = (0..parts.len()).collect();
    ranked.sort_by_key(|&index| parts[index].part_type.assembly_priority());
    for (slot, &index) in ranked.iter().enumerate() {
        parts[index].position = slot;
    }
    ranked.iter().map(|&index| parts[index].id.clone()).collect()
}

/// Score starts at 100, drops 30 per conflict and 10 per warning, and
/// gains 5 per part touching the standard vocabulary. Both level
/// vocabularies count, whatever the strategy level.
fn assembly_efficiency(strategy: &GoldenGateStrategy) -> Efficiency {
    let mut score: i64 = 100;
    score -= strategy.conflicts.len() as i64 * 30;
    score -= strategy.warnings.len() as i64 * 10;

    let standard_count = strategy
        .parts
        .iter()
        .filter(|part| {
            MOCLO_STANDARD.is_standard_overhang(&part.left_overhang, 0)
                || MOCLO_STANDARD.is_standard_overhang(&part.left_overhang, 1)
                || MOCLO_STANDARD.is_standard_overhang(&part.right_overhang, 0)
                || MOCLO_STANDARD.is_standard_overhang(&part.right_overhang, 1)
        })
        .count();
    score += standard_count as i64 * 5;

    if score >= 80 {
        Efficiency::High
    } else if score >= 50 {
        Efficiency::Medium
    } else {
        Efficiency::Low
    }
}

/// Projects a strategy into a single-pot reaction: pooled part sizes,
/// the deduplicated overhang set of the expected circular product, and
/// a numeric efficiency estimate.
pub fn generate_assembly_reaction(strategy: &GoldenGateStrategy, enzyme: &str) -> AssemblyReaction {
    let size = strategy
        .parts
        .iter()
        .map(|part| part.sequence.as_deref().map_or(0, str::len))
        .sum();
    let overhangs: Vec<String> = strategy
        .parts
        .iter()
        .flat_map(|part| [part.left_overhang.clone(), part.right_overhang.clone()])
        .unique()
        .collect();

    AssemblyReaction {
        enzyme: enzyme.to_string(),
        parts: strategy.parts.clone(),
        expected_product: ExpectedProduct {
            size,
            overhangs,
            circularized: true,
        },
        efficiency: strategy.efficiency.reaction_rate(),
        warnings: strategy.warnings.clone(),
    }
}

/// Canonical fusion sites per part type for one assembly level.
/// Unknown levels yield an empty map. The requested part types do not
/// filter the table; callers index into it.
pub fn suggest_optimal_overhangs(
    _part_types: &[String],
    level: u8,
) -> HashMap<String, OverhangPair> {
    MOCLO_STANDARD
        .suggested_overhangs(level)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type2s_enzyme::{OverhangType, Strand};

    fn site(position: usize, overhang: &str) -> TypeIisSite {
        TypeIisSite {
            enzyme: "BsaI".to_string(),
            position,
            strand: Strand::Forward,
            recognition_site: "GGTCTC".to_string(),
            cut_position_top: position as i64 + 1,
            cut_position_bottom: position as i64 + 5,
            overhang_sequence: overhang.to_string(),
            overhang_type: OverhangType::FivePrime,
        }
    }

    fn part(id: &str, part_type: &str, overhangs: Option<(&str, &str)>) -> Part {
        let mut part = Part::new(id, id, "ATGCATGC");
        part.part_type = part_type.to_string();
        if let Some((left, right)) = overhangs {
            part.sites = vec![site(10, left), site(50, right)];
        }
        part
    }

    #[test]
    fn test_empty_input_yields_default_strategy() {
        let strategy = analyze_part_compatibility(&[]);
        assert!(strategy.parts.is_empty());
        assert!(strategy.assembly_order.is_empty());
        assert!(strategy.conflicts.is_empty());
        assert!(strategy.warnings.is_empty());
        assert_eq!(strategy.level, 2);
        assert_eq!(strategy.efficiency, Efficiency::High);
        assert_eq!(strategy.backbone.id, "default_backbone");
        assert_eq!(strategy.backbone.left_overhang, "CGCT");
        assert_eq!(strategy.backbone.right_overhang, "GGAG");
        assert!(strategy.backbone.compatible);
    }

    #[test]
    fn test_level_inference() {
        let basic = vec![part("p", "promoter", None), part("c", "cds", None)];
        assert_eq!(analyze_part_compatibility(&basic).level, 0);

        let units = vec![
            part("p", "promoter", None),
            part("tu", "transcription_unit", None),
        ];
        assert_eq!(analyze_part_compatibility(&units).level, 1);

        let higher = vec![part("x", "misc", None)];
        assert_eq!(analyze_part_compatibility(&higher).level, 2);
    }

    #[test]
    fn test_backbone_selection_prefers_first_candidate() {
        let parts = vec![
            part("p", "promoter", None),
            part("bb1", "backbone", Some(("CGCT", "GGAG"))),
            part("bb2", "backbone", None),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert_eq!(strategy.backbone.id, "bb1");
        assert_eq!(strategy.backbone.left_overhang, "CGCT");
    }

    #[test]
    fn test_backbone_detected_by_markers_and_name() {
        let mut with_resistance = part("r", "cds", None);
        with_resistance.resistance = Some("AmpR".to_string());
        let strategy = analyze_part_compatibility(&[with_resistance]);
        assert_eq!(strategy.backbone.id, "r");

        let mut named = part("v", "cds", None);
        named.name = "MyVector2".to_string();
        let strategy = analyze_part_compatibility(&[named]);
        assert_eq!(strategy.backbone.id, "v");
    }

    #[test]
    fn test_part_conversion_and_overhang_extraction() {
        let mut library_part = part("c1", "Coding_Sequence", None);
        // Out of positional order on purpose; extraction sorts first.
        library_part.sites = vec![site(50, "GCTT"), site(10, "AATG")];
        let strategy = analyze_part_compatibility(&[library_part]);
        let converted = &strategy.parts[0];
        assert_eq!(converted.part_type, PartType::Cds);
        assert_eq!(converted.left_overhang, "AATG");
        assert_eq!(converted.right_overhang, "GCTT");
        assert!(converted.compatible);
    }

    #[test]
    fn test_too_few_sites_falls_back_to_sentinel() {
        let mut lone = part("solo", "promoter", None);
        lone.sites = vec![site(10, "AATG")];
        let strategy = analyze_part_compatibility(&[lone]);
        let converted = &strategy.parts[0];
        assert_eq!(converted.left_overhang, FALLBACK_OVERHANG);
        assert_eq!(converted.right_overhang, FALLBACK_OVERHANG);
        assert!(!converted.compatible);
    }

    #[test]
    fn test_matching_ends_are_incompatible() {
        let same = part("s", "cds", Some(("AATG", "AATG")));
        let strategy = analyze_part_compatibility(&[same]);
        assert!(!strategy.parts[0].compatible);
    }

    #[test]
    fn test_reused_overhangs_tank_efficiency() {
        let parts = vec![
            part("p1", "promoter", Some(("CAGT", "GTCA"))),
            part("p2", "cds", Some(("CAGT", "GTCA"))),
            part("p3", "terminator", Some(("CAGT", "AGCT"))),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert_eq!(
            strategy.conflicts,
            vec![
                "Overhang CAGT used 3 times - will cause assembly conflicts",
                "Overhang GTCA used twice on the same side",
            ]
        );
        assert_eq!(
            strategy.warnings,
            vec!["Overhang AGCT is palindromic - may reduce assembly efficiency"]
        );
        assert_eq!(strategy.efficiency, Efficiency::Low);
    }

    #[test]
    fn test_one_left_one_right_pairing_is_clean() {
        let parts = vec![
            part("a", "promoter", Some(("GGAG", "AATG"))),
            part("b", "cds", Some(("AATG", "GCTT"))),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert!(strategy.conflicts.is_empty());
        assert_eq!(strategy.efficiency, Efficiency::High);
    }

    #[test]
    fn test_problematic_pair_warning() {
        let parts = vec![
            part("a", "promoter", Some(("AAAA", "GGAG"))),
            part("b", "cds", Some(("TTTT", "CGCT"))),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert!(strategy.warnings.contains(
            &"Overhangs AAAA and TTTT may have reduced ligation efficiency".to_string()
        ));
    }

    #[test]
    fn test_assembly_order_and_positions() {
        let parts = vec![
            part("t", "terminator", None),
            part("p", "promoter", None),
            part("c", "cds", None),
            part("b", "backbone", None),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert_eq!(strategy.assembly_order, vec!["b", "p", "c", "t"]);
        // Parts keep input order; positions record the assigned slot.
        assert_eq!(strategy.parts[0].id, "t");
        assert_eq!(strategy.parts[0].position, 3);
        assert_eq!(strategy.parts[3].id, "b");
        assert_eq!(strategy.parts[3].position, 0);
    }

    #[test]
    fn test_order_ties_keep_input_order() {
        let parts = vec![
            part("c1", "cds", None),
            part("c2", "cds", None),
            part("c3", "cds", None),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert_eq!(strategy.assembly_order, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_generate_reaction() {
        let parts = vec![
            part("a", "promoter", Some(("CAGT", "GTCA"))),
            part("b", "cds", Some(("GTCA", "CAGT"))),
        ];
        let strategy = analyze_part_compatibility(&parts);
        assert_eq!(strategy.efficiency, Efficiency::High);

        let reaction = generate_assembly_reaction(&strategy, DEFAULT_ASSEMBLY_ENZYME);
        assert_eq!(reaction.enzyme, "BsaI");
        assert_eq!(reaction.expected_product.size, 16);
        assert_eq!(reaction.expected_product.overhangs, vec!["CAGT", "GTCA"]);
        assert!(reaction.expected_product.circularized);
        assert_eq!(reaction.efficiency, 0.9);
        assert_eq!(reaction.warnings, strategy.warnings);
    }

    #[test]
    fn test_suggest_optimal_overhangs_by_level() {
        let level0 = suggest_optimal_overhangs(&[], 0);
        assert_eq!(level0.len(), 4);
        assert_eq!(level0["promoter"].left, "GGAG");
        assert_eq!(level0["cds"].right, "GCTT");
        assert_eq!(level0["backbone"].left, "CGCT");

        let level1 = suggest_optimal_overhangs(&[], 1);
        assert_eq!(level1.len(), 2);
        assert_eq!(level1["transcription_unit"].left, "GCCA");

        assert!(suggest_optimal_overhangs(&[], 7).is_empty());

        // Requested types never narrow the table.
        let narrowed = suggest_optimal_overhangs(&["cds".to_string()], 0);
        assert_eq!(narrowed.len(), 4);
    }
}
