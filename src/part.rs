use crate::analysis::analyze_sequence;
use crate::type2s_enzyme::{Strand, TypeIisSite};
use serde::{Deserialize, Serialize};

/// Folder that always exists and receives unsorted parts.
pub const DEFAULT_FOLDER_ID: &str = "default";

/// Annotated span on a part sequence, half-open over 0-based indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFeature {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A materialized insert candidate between two BsaI cut sites. The
/// level is inherited from the carrying part; the type stays "other"
/// until someone curates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insert {
    pub id: String,
    pub sequence: String,
    pub start: i64,
    pub end: i64,
    pub left_overhang: String,
    pub right_overhang: String,
    pub moclo_level: u8,
    pub part_type: String,
}

/// A stored library record: the sequence itself plus everything
/// derived from it and the curation metadata around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sequence: String,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub part_type: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default)]
    pub sites: Vec<TypeIisSite>,
    #[serde(default)]
    pub inserts: Vec<Insert>,
    #[serde(default)]
    pub features: Vec<PartFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub moclo_compatible: bool,
    #[serde(default)]
    pub added_at: u64,
}

impl Part {
    /// A fresh record with no derived analysis yet. The caller decides
    /// when to run `refresh_analysis`, and the store stamps `added_at`.
    pub fn new(id: &str, name: &str, sequence: &str) -> Self {
        Part {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            sequence: sequence.to_string(),
            size: sequence.len(),
            part_type: "unknown".to_string(),
            level: 0,
            resistance: None,
            origin: None,
            sites: vec![],
            inserts: vec![],
            features: vec![],
            folder: None,
            moclo_compatible: false,
            added_at: 0,
        }
    }

    /// Recomputes everything derived from the sequence: recognition
    /// sites across the whole catalog, BsaI insert candidates, size and
    /// the MoClo compatibility flag.
    pub fn refresh_analysis(&mut self) {
        let analysis = analyze_sequence(&self.sequence);
        self.sites = analysis.flattened_sites();
        self.inserts = analysis
            .inserts
            .iter()
            .enumerate()
            .map(|(index, region)| Insert {
                id: format!("{}_insert_{}", self.id, index + 1),
                sequence: region.slice_of(&self.sequence),
                start: region.start,
                end: region.end,
                left_overhang: region.left_overhang.clone(),
                right_overhang: region.right_overhang.clone(),
                moclo_level: self.level,
                part_type: "other".to_string(),
            })
            .collect();
        self.size = self.sequence.len();
        self.moclo_compatible = !self.sites.is_empty();
    }

    pub fn folder_or_default(&self) -> &str {
        self.folder
            .as_deref()
            .filter(|folder| !folder.is_empty())
            .unwrap_or(DEFAULT_FOLDER_ID)
    }
}

/// Grouping bucket for library records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
    #[serde(default)]
    pub created_at: u64,
}
