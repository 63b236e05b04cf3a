use crate::error::Result;
use crate::types::PhantomAgeGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Empirical geometry constants
///
/// The defaults reproduce the values the conversion has historically used.
/// Their physical derivation is not documented; they are kept as data so a
/// site can override them from a JSON file after review.
///
/// # Example
///
/// ```
/// use rdsr_ncirf_core::geometry::CalibrationData;
///
/// let calibration = CalibrationData::default();
/// assert_eq!(calibration.srd_offset_mm, 150.0);
/// assert!(calibration.devices.contains_key("AXIS05187"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationData {
    /// SRD approximation when the reference point distance is not
    /// reported: SRD = SID − offset (mm)
    pub srd_offset_mm: f64,

    /// Offsets for systems reporting beam position relative to the table
    pub beam_relative: BeamRelativeOffsets,

    /// Table-position calibrations keyed by reported Device Name
    pub devices: BTreeMap<String, TableOffsetCalibration>,
}

impl Default for CalibrationData {
    fn default() -> Self {
        let mut devices = BTreeMap::new();
        devices.insert("AXIS05187".to_string(), TableOffsetCalibration::axis05187());

        Self {
            srd_offset_mm: 150.0,
            beam_relative: BeamRelativeOffsets::default(),
            devices,
        }
    }
}

impl CalibrationData {
    /// Loads calibration data from a JSON file
    ///
    /// Missing keys keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Table calibration for a reported device name
    pub fn device(&self, name: &str) -> Option<&TableOffsetCalibration> {
        self.devices.get(name.trim())
    }
}

/// Phantom-frame origin for beam-relative table readings (cm)
///
/// x = x_base + (table lateral − lateral beam) / 10
/// y = (table height − SID) / 10
/// z = z_base + (table longitudinal − longitudinal beam) / 10
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamRelativeOffsets {
    pub x_base_cm: f64,
    pub z_base_cm: f64,
}

impl Default for BeamRelativeOffsets {
    fn default() -> Self {
        Self {
            x_base_cm: 42.0,
            z_base_cm: 163.0,
        }
    }
}

/// Linear map from one table sensor reading to a phantom coordinate
///
/// coordinate (cm) = base + (reading − reference) × scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCalibration {
    pub base: f64,
    pub reference: f64,
    pub scale: f64,
}

impl AxisCalibration {
    pub const fn new(base: f64, reference: f64, scale: f64) -> Self {
        Self {
            base,
            reference,
            scale,
        }
    }

    pub fn apply(&self, reading: f64) -> f64 {
        self.base + (reading - self.reference) * self.scale
    }
}

/// Per-axis calibration for one phantom age group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupOffsets {
    pub age_group: PhantomAgeGroup,
    pub lateral: AxisCalibration,
    pub height: AxisCalibration,
    pub longitudinal: AxisCalibration,
}

/// Table-position calibration of one device, varying by age group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableOffsetCalibration {
    pub groups: Vec<AgeGroupOffsets>,
}

impl TableOffsetCalibration {
    pub fn for_age_group(&self, age_group: PhantomAgeGroup) -> Option<&AgeGroupOffsets> {
        self.groups.iter().find(|g| g.age_group == age_group)
    }

    fn axis05187() -> Self {
        const LAT: f64 = 594.2;
        const HEIGHT: f64 = 151.6;
        const LONG: f64 = 5.1;

        let group = |age_group, lateral: (f64, f64), height: (f64, f64), longitudinal: (f64, f64)| {
            AgeGroupOffsets {
                age_group,
                lateral: AxisCalibration::new(lateral.0, LAT, lateral.1),
                height: AxisCalibration::new(height.0, HEIGHT, height.1),
                longitudinal: AxisCalibration::new(longitudinal.0, LONG, longitudinal.1),
            }
        };

        Self {
            groups: vec![
                group(PhantomAgeGroup::Newborn, (12.4, 0.1), (7.2, 0.1), (39.7, 0.1)),
                group(PhantomAgeGroup::OneYear, (19.5, 0.01), (8.5, 0.1), (67.7, 0.1)),
                group(PhantomAgeGroup::FiveYear, (26.2, 0.01), (10.1, 0.01), (102.4, 0.01)),
                group(PhantomAgeGroup::TenYear, (34.4, 0.1), (11.4, 0.1), (130.7, 0.1)),
                group(PhantomAgeGroup::FifteenYear, (44.0, 0.1), (14.6, 0.1), (156.3, 0.1)),
                group(PhantomAgeGroup::Adult, (47.3, 0.1), (15.6, 0.1), (165.3, 0.1)),
            ],
        }
    }
}
