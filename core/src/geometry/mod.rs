//! Irradiation geometry in the phantom frame
//!
//! - [`field_size_at_isocenter`]: collimated field projected to the isocenter plane
//! - [`resolve_isocenter`]: document isocenter from manual input, table
//!   calibration or region presets
//! - [`CalibrationData`]: the empirical constants both rely on

mod calibration;
mod field;
mod isocenter;

pub use calibration::{
    AgeGroupOffsets, AxisCalibration, BeamRelativeOffsets, CalibrationData, TableOffsetCalibration,
};
pub use field::{field_size_at_isocenter, FieldSize};
pub use isocenter::{
    preset_isocenter, resolve_isocenter, BodyRegion, IsocenterSource, ResolvedIsocenter,
};
