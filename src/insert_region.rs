use crate::{FACILITY, type2s_enzyme::TypeIisEnzyme};
use serde::{Deserialize, Serialize};

/// A candidate insert between two consecutive sites of the same enzyme:
/// the region from the rightmost cut of the left site to the leftmost
/// cut of the right site, with the flanking overhangs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRegion {
    pub start: i64,
    pub end: i64,
    pub left_overhang: String,
    pub right_overhang: String,
}

impl InsertRegion {
    /// The spanned substring, clamped to the buffer.
    pub fn slice_of(&self, sequence: &str) -> String {
        FACILITY.clamped_substring(sequence, self.start, self.end)
    }
}

/// Adjacent-pair sweep over the ordered site list. Inverted or empty
/// windows are skipped silently; they are not an error.
pub fn find_insert_regions(sequence: &str, enzyme: &TypeIisEnzyme) -> Vec<InsertRegion> {
    let sites = enzyme.find_sites(sequence);
    let mut regions = vec![];
    for pair in sites.windows(2) {
        let start = pair[0].cut_position_top.max(pair[0].cut_position_bottom);
        let end = pair[1].cut_position_top.min(pair[1].cut_position_bottom);
        if end > start {
            regions.push(InsertRegion {
                start,
                end,
                left_overhang: pair[0].overhang_sequence.clone(),
                right_overhang: pair[1].overhang_sequence.clone(),
            });
        }
    }
    regions
}
