use crate::error::{NcirfError, Result};
use crate::extraction::concepts::{FILTER_MATERIAL, FILTER_THICKNESS_MAX, FILTER_THICKNESS_MIN};
use crate::extraction::IrradiationEvent;
use std::fmt;

/// Added beam filtration of one irradiation event
///
/// Only flat filters are representable: the reported minimum and maximum
/// thickness must agree.
///
/// # Example
///
/// ```
/// use rdsr_ncirf_core::FilterSpec;
///
/// let filter = FilterSpec::from_range("Copper or Copper compound", 0.2, 0.2).unwrap();
/// assert_eq!(filter.thickness, 0.2);
///
/// assert!(FilterSpec::from_range("Copper or Copper compound", 0.1, 0.3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Material as reported (code meaning)
    pub material: String,

    /// Thickness in mm
    pub thickness: f64,
}

impl FilterSpec {
    /// Builds a filter from reported minimum/maximum thickness
    ///
    /// # Errors
    ///
    /// Returns `NonuniformFilter` if the thicknesses differ.
    pub fn from_range(material: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        if min != max {
            return Err(NcirfError::NonuniformFilter { min, max });
        }
        Ok(Self {
            material: material.into(),
            thickness: min,
        })
    }

    /// Reads the filter parameters of an irradiation event
    pub fn from_event(event: &IrradiationEvent) -> Result<Self> {
        let material = event.text(FILTER_MATERIAL)?;
        let min = event.number(FILTER_THICKNESS_MIN)?;
        let max = event.number(FILTER_THICKNESS_MAX)?;
        Self::from_range(material, min, max)
    }

    /// Calibrated material kind of this filter
    pub fn material_kind(&self) -> Result<FilterMaterial> {
        FilterMaterial::parse(&self.material)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mm {}", self.thickness, self.material)
    }
}

/// Filter materials with an HVL calibration table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMaterial {
    Copper,
}

impl FilterMaterial {
    /// Recognizes a material from its reported name
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFilter` for any material without calibration.
    pub fn parse(s: &str) -> Result<Self> {
        let s_lower = s.to_lowercase();
        if s_lower.contains("copper") {
            Ok(FilterMaterial::Copper)
        } else {
            Err(NcirfError::UnsupportedFilter(s.to_string()))
        }
    }
}
