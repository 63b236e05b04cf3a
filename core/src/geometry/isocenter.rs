use crate::error::{NcirfError, Result};
use crate::extraction::concepts::{
    DEVICE_NAME, DISTANCE_SOURCE_TO_ISOCENTER, LATERAL_BEAM_POSITION, LONGITUDINAL_BEAM_POSITION,
    TABLE_HEIGHT_POSITION, TABLE_LATERAL_POSITION, TABLE_LONGITUDINAL_POSITION, TARGET_REGION,
};
use crate::extraction::IrradiationEvent;
use crate::types::{Isocenter, PhantomAgeGroup};
use log::debug;
use std::fmt;

use super::calibration::CalibrationData;

/// Canonical body region with preset isocenter coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRegion {
    Abdomen,
    Chest,
    Head,
    Extremity,
}

impl BodyRegion {
    /// Maps a reported Target Region onto its canonical region
    ///
    /// "Entire body" shares the abdomen coordinates; "Heart" and
    /// "Coronary artery" share the chest coordinates.
    pub fn from_target_region(s: &str) -> Option<Self> {
        match s.trim() {
            "Abdomen" | "Entire body" => Some(BodyRegion::Abdomen),
            "Chest" | "Heart" | "Coronary artery" => Some(BodyRegion::Chest),
            "Head" => Some(BodyRegion::Head),
            "Extremity" => Some(BodyRegion::Extremity),
            _ => None,
        }
    }

    pub fn simple_name(&self) -> &'static str {
        match self {
            BodyRegion::Abdomen => "Abdomen",
            BodyRegion::Chest => "Chest",
            BodyRegion::Head => "Head",
            BodyRegion::Extremity => "Extremity",
        }
    }

    /// Preset isocenter of the arm-raised phantom
    pub fn preset(&self, age_group: PhantomAgeGroup) -> Isocenter {
        Isocenter::from(self.presets()[usize::from(age_group.number() - 1)])
    }

    /// Preset (x, y, z) in cm per age group 1–6
    fn presets(&self) -> &'static [[f64; 3]; 6] {
        const ABDOMEN: [[f64; 3]; 6] = [
            [12.5, 6.5, 22.0],
            [19.5, 7.5, 40.0],
            [26.0, 8.5, 66.0],
            [34.5, 9.5, 87.0],
            [40.5, 12.5, 104.0],
            [44.0, 13.5, 105.0],
        ];
        const CHEST: [[f64; 3]; 6] = [
            [12.5, 6.5, 31.0],
            [19.5, 7.5, 52.0],
            [26.0, 8.5, 79.0],
            [34.5, 9.5, 105.0],
            [40.5, 12.5, 121.0],
            [44.0, 13.5, 121.0],
        ];
        const HEAD: [[f64; 3]; 6] = [
            [12.5, 6.5, 42.0],
            [19.5, 7.5, 69.0],
            [26.0, 8.5, 101.5],
            [34.5, 9.5, 131.0],
            [40.5, 12.5, 152.5],
            [44.0, 13.5, 154.5],
        ];
        const EXTREMITY: [[f64; 3]; 6] = [
            [4.3, 6.5, 11.0],
            [15.5, 10.0, 18.0],
            [21.0, 12.5, 29.0],
            [28.0, 14.5, 38.0],
            [32.0, 20.0, 45.0],
            [36.0, 21.0, 45.0],
        ];

        match self {
            BodyRegion::Abdomen => &ABDOMEN,
            BodyRegion::Chest => &CHEST,
            BodyRegion::Head => &HEAD,
            BodyRegion::Extremity => &EXTREMITY,
        }
    }
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Preset isocenter for a reported target region and phantom age group
///
/// # Errors
///
/// Returns `InvalidRegionOrAge` for regions without presets.
pub fn preset_isocenter(target_region: &str, age_group: PhantomAgeGroup) -> Result<Isocenter> {
    Ok(canonical_region(target_region, age_group)?.preset(age_group))
}

fn canonical_region(target_region: &str, age_group: PhantomAgeGroup) -> Result<BodyRegion> {
    BodyRegion::from_target_region(target_region).ok_or_else(|| NcirfError::InvalidRegionOrAge {
        region: target_region.to_string(),
        age_group: age_group.number(),
    })
}

/// Where a document's isocenter came from
#[derive(Debug, Clone, PartialEq)]
pub enum IsocenterSource {
    /// Supplied by the operator
    Manual,
    /// Table position relative to reported beam position
    BeamRelative,
    /// Device-specific table calibration, by Device Name
    DeviceTable(String),
    /// Region preset
    Preset(BodyRegion),
}

impl fmt::Display for IsocenterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsocenterSource::Manual => write!(f, "manual"),
            IsocenterSource::BeamRelative => write!(f, "beam-relative table position"),
            IsocenterSource::DeviceTable(device) => write!(f, "{} table calibration", device),
            IsocenterSource::Preset(region) => write!(f, "{} preset", region),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIsocenter {
    pub isocenter: Isocenter,
    pub source: IsocenterSource,
}

/// Resolves the isocenter of a document
///
/// Sources in priority order:
/// 1. `manual` coordinates
/// 2. beam-relative table position, when the event reports both lateral and
///    longitudinal beam positions
/// 3. the table calibration of the reported Device Name
/// 4. the preset of the event's Target Region
///
/// `event` is the document's first event with dose.
pub fn resolve_isocenter(
    manual: Option<Isocenter>,
    event: &IrradiationEvent,
    age_group: PhantomAgeGroup,
    calibration: &CalibrationData,
) -> Result<ResolvedIsocenter> {
    if let Some(isocenter) = manual {
        return Ok(ResolvedIsocenter {
            isocenter,
            source: IsocenterSource::Manual,
        });
    }

    if event.contains(LATERAL_BEAM_POSITION) && event.contains(LONGITUDINAL_BEAM_POSITION) {
        let offsets = &calibration.beam_relative;
        let isocenter = Isocenter::new(
            offsets.x_base_cm
                + (event.number(TABLE_LATERAL_POSITION)? - event.number(LATERAL_BEAM_POSITION)?)
                    / 10.0,
            (event.number(TABLE_HEIGHT_POSITION)? - event.number(DISTANCE_SOURCE_TO_ISOCENTER)?)
                / 10.0,
            offsets.z_base_cm
                + (event.number(TABLE_LONGITUDINAL_POSITION)?
                    - event.number(LONGITUDINAL_BEAM_POSITION)?)
                    / 10.0,
        );
        return Ok(ResolvedIsocenter {
            isocenter,
            source: IsocenterSource::BeamRelative,
        });
    }

    if let Some(device) = event.optional_text(DEVICE_NAME) {
        match calibration
            .device(device)
            .and_then(|table| table.for_age_group(age_group))
        {
            Some(offsets) => {
                let isocenter = Isocenter::new(
                    offsets.lateral.apply(event.number(TABLE_LATERAL_POSITION)?),
                    offsets.height.apply(event.number(TABLE_HEIGHT_POSITION)?),
                    offsets
                        .longitudinal
                        .apply(event.number(TABLE_LONGITUDINAL_POSITION)?),
                );
                return Ok(ResolvedIsocenter {
                    isocenter,
                    source: IsocenterSource::DeviceTable(device.to_string()),
                });
            }
            None => debug!(
                "No table calibration for device '{}' and age group {}",
                device, age_group
            ),
        }
    }

    let region = canonical_region(event.text(TARGET_REGION)?, age_group)?;
    Ok(ResolvedIsocenter {
        isocenter: region.preset(age_group),
        source: IsocenterSource::Preset(region),
    })
}
