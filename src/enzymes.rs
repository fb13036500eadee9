use crate::type2s_enzyme::TypeIisEnzyme;
use anyhow::{anyhow, Result};

const BUILTIN_TYPE2S_JSON: &str = include_str!("../assets/type2s_enzymes.json");

/// The fixed Type IIS enzyme catalog, parsed once from the embedded
/// table. Every analysis runs against these entries.
#[derive(Clone, Debug)]
pub struct Enzymes {
    type2s_enzymes: Vec<TypeIisEnzyme>,
    max_motif_length: usize,
}

impl Enzymes {
    pub fn from_json_text(json_text: &str) -> Result<Self> {
        let type2s_enzymes: Vec<TypeIisEnzyme> = serde_json::from_str(json_text)?;
        for enzyme in &type2s_enzymes {
            if enzyme.recognition_site.is_empty() {
                return Err(anyhow!("Bad Type IIS enzyme {}: empty motif", enzyme.name));
            }
            if enzyme.cut_offset_reverse <= enzyme.cut_offset_forward {
                return Err(anyhow!(
                    "Bad Type IIS enzyme {}: bottom-strand cut must lie beyond the top-strand cut",
                    enzyme.name
                ));
            }
            if enzyme.overhang_length != enzyme.cut_offset_reverse - enzyme.cut_offset_forward {
                return Err(anyhow!(
                    "Bad Type IIS enzyme {}: overhang length does not match the cut offsets",
                    enzyme.name
                ));
            }
        }
        let max_motif_length = type2s_enzymes
            .iter()
            .map(|enzyme| enzyme.recognition_site.len())
            .max()
            .unwrap_or(0);
        Ok(Self {
            type2s_enzymes,
            max_motif_length,
        })
    }

    pub fn new() -> Result<Self> {
        Self::from_json_text(BUILTIN_TYPE2S_JSON)
    }

    #[inline(always)]
    pub fn all(&self) -> &[TypeIisEnzyme] {
        &self.type2s_enzymes
    }

    pub fn by_name(&self, name: &str) -> Option<&TypeIisEnzyme> {
        self.type2s_enzymes
            .iter()
            .find(|enzyme| enzyme.name.eq_ignore_ascii_case(name))
    }

    #[inline(always)]
    pub fn max_motif_length(&self) -> usize {
        self.max_motif_length
    }
}

impl Default for Enzymes {
    fn default() -> Self {
        Enzymes::new().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let enzymes = Enzymes::default();
        assert_eq!(enzymes.all().len(), 8);
        assert_eq!(enzymes.max_motif_length(), 7);

        let bsai = enzymes.by_name("BsaI").unwrap();
        assert_eq!(bsai.recognition_site, "GGTCTC");
        assert_eq!(bsai.cut_offset_forward, 1);
        assert_eq!(bsai.cut_offset_reverse, 5);
        assert_eq!(bsai.overhang_length, 4);

        let btsi = enzymes.by_name("btsi").unwrap();
        assert_eq!(btsi.name, "BtsI");
        assert_eq!(btsi.overhang_length, 6);

        assert!(enzymes.by_name("EcoRI").is_none());
    }

    #[test]
    fn test_bad_catalog_rejected() {
        let swapped = r#"[{ "name": "BadI", "recognition_site": "GGTCTC",
            "cut_offset_forward": 5, "cut_offset_reverse": 1, "overhang_length": 4 }]"#;
        assert!(Enzymes::from_json_text(swapped).is_err());

        let mismatched = r#"[{ "name": "BadI", "recognition_site": "GGTCTC",
            "cut_offset_forward": 1, "cut_offset_reverse": 5, "overhang_length": 6 }]"#;
        assert!(Enzymes::from_json_text(mismatched).is_err());
    }
}
