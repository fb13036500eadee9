use crate::{ENZYMES, FACILITY};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Type IIS restriction enzyme: the recognition motif is separate from
/// the cut site, so the two strand nicks are described as offsets from
/// the start of the motif on the top strand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIisEnzyme {
    pub name: String,
    pub recognition_site: String,
    pub cut_offset_forward: usize,
    pub cut_offset_reverse: usize,
    pub overhang_length: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverhangType {
    #[serde(rename = "5prime")]
    FivePrime,
    #[serde(rename = "3prime")]
    ThreePrime,
}

/// One recognition-site occurrence. All coordinates live in the forward
/// coordinate space regardless of which strand the motif was found on.
/// Cut positions are signed: a reverse-strand site near the start of the
/// buffer can nick upstream of position zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIisSite {
    pub enzyme: String,
    pub position: usize,
    pub strand: Strand,
    pub recognition_site: String,
    pub cut_position_top: i64,
    pub cut_position_bottom: i64,
    pub overhang_sequence: String,
    pub overhang_type: OverhangType,
}

impl TypeIisEnzyme {
    /// All occurrences of the recognition motif on both strands, with cut
    /// coordinates and the exposed overhang. The reverse strand is
    /// searched by scanning the forward buffer for the reverse-complement
    /// motif, so no second buffer is allocated and coordinates stay
    /// uniform. Overlapping occurrences are all reported. The buffer is
    /// treated as linear; windows past either end are clamped, not
    /// wrapped.
    pub fn find_sites(&self, sequence: &str) -> Vec<TypeIisSite> {
        let seq = sequence.to_ascii_uppercase();
        let motif = self.recognition_site.to_ascii_uppercase();
        if seq.is_empty() || motif.is_empty() {
            return vec![];
        }

        let mut sites = vec![];
        for pos in motif_positions(seq.as_bytes(), motif.as_bytes()) {
            let cut_top = (pos + self.cut_offset_forward) as i64;
            let cut_bottom = (pos + self.cut_offset_reverse) as i64;
            let (overhang_sequence, overhang_type) = overhang_between(&seq, cut_top, cut_bottom);
            sites.push(TypeIisSite {
                enzyme: self.name.clone(),
                position: pos,
                strand: Strand::Forward,
                recognition_site: motif.clone(),
                cut_position_top: cut_top,
                cut_position_bottom: cut_bottom,
                overhang_sequence,
                overhang_type,
            });
        }

        let motif_rc = FACILITY.reverse_complement(&motif);
        let motif_len = motif.len() as i64;
        for pos in motif_positions(seq.as_bytes(), motif_rc.as_bytes()) {
            let cut_top = pos as i64 + motif_len - self.cut_offset_reverse as i64;
            let cut_bottom = pos as i64 + motif_len - self.cut_offset_forward as i64;
            let (raw, overhang_type) = overhang_between(&seq, cut_top, cut_bottom);
            sites.push(TypeIisSite {
                enzyme: self.name.clone(),
                position: pos,
                strand: Strand::Reverse,
                recognition_site: motif_rc.clone(),
                cut_position_top: cut_top,
                cut_position_bottom: cut_bottom,
                // The overhang is physically read off the bottom strand.
                overhang_sequence: FACILITY.reverse_complement(&raw),
                overhang_type,
            });
        }

        sites.sort_by_key(|site| site.position);
        sites
    }
}

/// Runs the site finder for every catalog enzyme, one scan per enzyme in
/// parallel. Never fails; enzymes without occurrences map to empty lists.
pub fn analyze_all_enzymes(sequence: &str) -> HashMap<String, Vec<TypeIisSite>> {
    ENZYMES
        .all()
        .par_iter()
        .map(|enzyme| (enzyme.name.clone(), enzyme.find_sites(sequence)))
        .collect()
}

fn overhang_between(sequence: &str, cut_top: i64, cut_bottom: i64) -> (String, OverhangType) {
    if cut_top < cut_bottom {
        (
            FACILITY.clamped_substring(sequence, cut_top, cut_bottom),
            OverhangType::FivePrime,
        )
    } else {
        (
            FACILITY.clamped_substring(sequence, cut_bottom, cut_top),
            OverhangType::ThreePrime,
        )
    }
}

// Overlap-tolerant scan: the cursor advances by one after each match,
// never by the motif length.
fn motif_positions(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() || haystack.len() < needle.len() {
        return positions;
    }
    let mut from = 0;
    while let Some(found) = haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
    {
        let pos = from + found;
        positions.push(pos);
        from = pos + 1;
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bsai() -> TypeIisEnzyme {
        ENZYMES.by_name("BsaI").unwrap().clone()
    }

    #[test]
    fn test_forward_sites_overlap_tolerant() {
        let sites = bsai().find_sites("GGTCTCAGGTCTC");
        assert_eq!(sites.len(), 2);

        assert_eq!(sites[0].position, 0);
        assert_eq!(sites[0].strand, Strand::Forward);
        assert_eq!(sites[0].cut_position_top, 1);
        assert_eq!(sites[0].cut_position_bottom, 5);
        assert_eq!(sites[0].overhang_sequence, "GTCT");
        assert_eq!(sites[0].overhang_type, OverhangType::FivePrime);

        assert_eq!(sites[1].position, 7);
        assert_eq!(sites[1].cut_position_top, 8);
        assert_eq!(sites[1].cut_position_bottom, 12);
        assert_eq!(sites[1].overhang_sequence, "GTCT");
    }

    #[test]
    fn test_adjacent_motif_occurrences() {
        let enzyme = TypeIisEnzyme {
            name: "TestI".to_string(),
            recognition_site: "AA".to_string(),
            cut_offset_forward: 0,
            cut_offset_reverse: 1,
            overhang_length: 1,
        };
        let positions: Vec<usize> = enzyme
            .find_sites("AAAA")
            .iter()
            .map(|site| site.position)
            .collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_reverse_strand_site() {
        let seq = "TTTGAGACCTTT";
        let sites = bsai().find_sites(seq);
        assert_eq!(sites.len(), 1);

        let site = &sites[0];
        assert_eq!(site.position, 3);
        assert_eq!(site.strand, Strand::Reverse);
        assert_eq!(site.recognition_site, "GAGACC");
        assert_eq!(site.cut_position_top, 4);
        assert_eq!(site.cut_position_bottom, 8);
        assert_eq!(site.overhang_type, OverhangType::FivePrime);
        assert_eq!(
            site.overhang_sequence,
            FACILITY.reverse_complement(&seq[4..8])
        );
        assert_eq!(site.overhang_sequence, "GTCT");
    }

    #[test]
    fn test_reverse_site_cuts_upstream_of_origin() {
        let btsi = ENZYMES.by_name("BtsI").unwrap().clone();
        let sites = btsi.find_sites("CACTGCAAA");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].strand, Strand::Reverse);
        assert_eq!(sites[0].cut_position_top, -2);
        assert_eq!(sites[0].cut_position_bottom, 4);
        // The window is clipped at the buffer start.
        assert_eq!(sites[0].overhang_sequence, "AGTG");
    }

    #[test]
    fn test_lowercase_and_empty_input() {
        let sites = bsai().find_sites("ggtctcaggtctc");
        assert_eq!(sites.len(), 2);
        assert!(bsai().find_sites("").is_empty());
        assert!(bsai().find_sites("ATATAT").is_empty());
    }

    #[test]
    fn test_find_sites_is_pure() {
        let seq = "GGTCTCAAAATTTTCCCGAGACC";
        assert_eq!(bsai().find_sites(seq), bsai().find_sites(seq));
    }

    #[test]
    fn test_analyze_all_enzymes_covers_catalog() {
        let results = analyze_all_enzymes("GGTCTCAGGTCTC");
        assert_eq!(results.len(), ENZYMES.all().len());
        assert_eq!(results["BsaI"].len(), 2);
        assert!(results["AarI"].is_empty());
        assert_eq!(analyze_all_enzymes(""), analyze_all_enzymes(""));
    }
}
