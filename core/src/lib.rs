pub mod api;
pub mod beam;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod geometry;
pub mod output;
pub mod report;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::{Conversion, NcirfConverter, SkippedEvent};
pub use beam::{BeamQuality, HvlTable};
pub use cli::report::TextReport;
pub use error::{NcirfError, Result};
pub use extraction::{IrradiationEvent, ParameterValue};
pub use geometry::{CalibrationData, FieldSize, IsocenterSource, ResolvedIsocenter};
pub use types::*;
