use serde::{Deserialize, Serialize};
use std::fmt;

/// Phantom arm posture passed through to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmPosition {
    #[default]
    Raised,
    Lowered,
    Rotated,
}

impl ArmPosition {
    /// Numeric code used in the NCIRF batch file
    pub fn code(&self) -> u8 {
        match self {
            ArmPosition::Raised => 1,
            ArmPosition::Lowered => 2,
            ArmPosition::Rotated => 3,
        }
    }

    /// Parses the numeric NCIRF code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ArmPosition::Raised),
            2 => Some(ArmPosition::Lowered),
            3 => Some(ArmPosition::Rotated),
            _ => None,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ArmPosition::Raised => "raised",
            ArmPosition::Lowered => "lowered",
            ArmPosition::Rotated => "rotated",
        }
    }
}

impl fmt::Display for ArmPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Phantom sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientSex {
    #[default]
    Female,
    Male,
}

impl PatientSex {
    /// Numeric code used in the NCIRF batch file
    pub fn code(&self) -> u8 {
        match self {
            PatientSex::Female => 1,
            PatientSex::Male => 2,
        }
    }

    /// Parses a DICOM Patient's Sex value ("F" / "M")
    ///
    /// Other values ("O", empty) are not representable by a phantom.
    pub fn from_dicom(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "F" => Some(PatientSex::Female),
            "M" => Some(PatientSex::Male),
            _ => None,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            PatientSex::Female => "female",
            PatientSex::Male => "male",
        }
    }
}

impl fmt::Display for PatientSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Formula set used to derive simulation quantities
///
/// Two generations of the conversion formulas are in use:
/// - `Legacy`: lowest catalog HVL per kVp bucket, no distance correction
///   of field sizes, and every five-element content item read as a single
///   nested value.
/// - `Corrected`: HVL interpolated from the filter calibration table,
///   field sizes scaled to the isocenter plane, and composite concepts
///   ("X-Ray Filters") expanded into their sub-items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaProfile {
    Legacy,
    #[default]
    Corrected,
}

impl FormulaProfile {
    pub fn interpolates_hvl(&self) -> bool {
        matches!(self, FormulaProfile::Corrected)
    }

    pub fn corrects_distances(&self) -> bool {
        matches!(self, FormulaProfile::Corrected)
    }

    pub fn expands_composite_concepts(&self) -> bool {
        matches!(self, FormulaProfile::Corrected)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            FormulaProfile::Legacy => "legacy",
            FormulaProfile::Corrected => "corrected",
        }
    }
}

impl fmt::Display for FormulaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// What to do when a single irradiation event cannot be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventErrorPolicy {
    /// Drop the event, log it and record a diagnostic
    #[default]
    Skip,
    /// Fail the whole conversion on the first bad event
    Abort,
}
