//! Core type definitions for RDSR to NCIRF conversion
//!
//! This module provides the value types shared across the pipeline:
//! - [`PhantomAgeGroup`]: Age-matched phantom (groups 1–6) and the age classifier
//! - [`ArmPosition`], [`PatientSex`]: Phantom posture and sex codes
//! - [`FormulaProfile`]: Generation of the derivation formulas
//! - [`EventErrorPolicy`]: Skip-or-abort handling of failing events
//! - [`FilterSpec`]: Flat beam filter of one event
//! - [`Isocenter`]: Phantom-frame isocenter in cm
//! - [`NcirfRow`]: One output row of the batch file
//! - [`ConversionConfig`]: Per-document settings

mod age;
mod config;
mod enums;
mod filter;
mod isocenter;
mod row;

pub use age::{age_in_years, PhantomAgeGroup};
pub use config::{ConversionConfig, DEFAULT_HISTORIES};
pub use enums::{ArmPosition, EventErrorPolicy, FormulaProfile, PatientSex};
pub use filter::{FilterMaterial, FilterSpec};
pub use isocenter::Isocenter;
pub use row::NcirfRow;
