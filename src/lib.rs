use enzymes::Enzymes;
use facility::Facility;
use lazy_static::lazy_static;
use moclo_standard::MocloStandard;

pub mod analysis;
pub mod engine;
pub mod enzymes;
pub mod facility;
pub mod golden_gate;
pub mod insert_region;
pub mod moclo_standard;
pub mod overhang_validation;
pub mod part;
pub mod part_store;
pub mod sequence_import;
pub mod type2s_enzyme;

lazy_static! {
    // Type IIS enzyme catalog
    pub static ref ENZYMES: Enzymes = Enzymes::default();

    // Sequence utilities (cleaning, complements, GC)
    pub static ref FACILITY: Facility = Facility::default();

    // MoClo fusion site standard
    pub static ref MOCLO_STANDARD: MocloStandard = MocloStandard::default();
}
