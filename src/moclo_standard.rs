use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const BUILTIN_MOCLO_STANDARD_JSON: &str = include_str!("../assets/moclo_standard.json");

/// Left and right fusion sites recommended for one part type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverhangPair {
    pub left: String,
    pub right: String,
}

#[derive(Clone, Debug, Deserialize)]
struct StandardOverhangs {
    level0: Vec<String>,
    level1: Vec<String>,
}

/// The MoClo fusion-site vocabulary: per-level standard overhangs,
/// overhang pairs known to cross-ligate poorly, and the recommended
/// overhang assignment per part type.
#[derive(Clone, Debug, Deserialize)]
pub struct MocloStandard {
    standard_overhangs: StandardOverhangs,
    problematic_pairs: Vec<[String; 2]>,
    suggested_overhangs: HashMap<u8, HashMap<String, OverhangPair>>,
}

impl MocloStandard {
    pub fn new() -> Result<Self> {
        Self::from_json_text(BUILTIN_MOCLO_STANDARD_JSON)
    }

    pub fn from_json_text(text: &str) -> Result<Self> {
        let standard: MocloStandard = serde_json::from_str(text)?;
        let mut all_overhangs: Vec<&String> = vec![];
        all_overhangs.extend(&standard.standard_overhangs.level0);
        all_overhangs.extend(&standard.standard_overhangs.level1);
        for pair in &standard.problematic_pairs {
            all_overhangs.extend(pair.iter());
        }
        for assignment in standard.suggested_overhangs.values() {
            for pair in assignment.values() {
                all_overhangs.push(&pair.left);
                all_overhangs.push(&pair.right);
            }
        }
        for overhang in all_overhangs {
            if overhang.len() != 4 || !overhang.bytes().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')) {
                return Err(anyhow!("Bad MoClo overhang {overhang}: expected four bases ACGT"));
            }
        }
        Ok(standard)
    }

    /// The fusion-site vocabulary used for scoring at a given assembly
    /// level. Levels above 0 all use the level 1 vocabulary.
    pub fn standard_overhangs(&self, level: u8) -> &[String] {
        if level == 0 {
            &self.standard_overhangs.level0
        } else {
            &self.standard_overhangs.level1
        }
    }

    pub fn is_standard_overhang(&self, overhang: &str, level: u8) -> bool {
        self.standard_overhangs(level)
            .iter()
            .any(|standard| standard == overhang)
    }

    pub fn problematic_pairs(&self) -> &[[String; 2]] {
        &self.problematic_pairs
    }

    pub fn suggested_overhangs(&self, level: u8) -> Option<&HashMap<String, OverhangPair>> {
        self.suggested_overhangs.get(&level)
    }
}

impl Default for MocloStandard {
    fn default() -> Self {
        // The embedded standard must parse; a broken asset is a build defect.
        Self::new().unwrap()
    }
}
