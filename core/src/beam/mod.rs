//! Beam quality estimation
//!
//! Maps a reported kVp and filtration onto one of the simulator's
//! pre-computed beam qualities, using an HVL calibration grid.

mod quality;
mod table;

pub use quality::{
    catalog, estimate_beam_quality, lowest_catalog_quality, round_kvp, snap_to_catalog,
    BeamQuality, KVP_BUCKETS,
};
pub use table::HvlTable;
