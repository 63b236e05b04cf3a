use crate::error::{NcirfError, Result};
use crate::extraction::concepts::{
    COLLIMATED_FIELD_AREA, COLLIMATED_FIELD_HEIGHT, COLLIMATED_FIELD_WIDTH,
    DISTANCE_SOURCE_TO_DETECTOR, DISTANCE_SOURCE_TO_ISOCENTER, DISTANCE_SOURCE_TO_REFERENCE_POINT,
    DOSE_AREA_PRODUCT, DOSE_RP,
};
use crate::extraction::IrradiationEvent;
use crate::types::FormulaProfile;
use log::debug;

/// Radiation field at the isocenter plane (cm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSize {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl FieldSize {
    /// Square field of the given side
    ///
    /// Used whenever only an area is known; the true aspect ratio is lost.
    pub fn square(side_cm: f64) -> Self {
        Self {
            width_cm: side_cm,
            height_cm: side_cm,
        }
    }

    pub fn is_square(&self) -> bool {
        self.width_cm == self.height_cm
    }
}

/// Field size of an event projected to the isocenter plane
///
/// Distances are reported in mm, collimated dimensions in mm, collimated
/// area in m², DAP in Gy·m² and reference point dose in Gy.
///
/// | height & width | area / height / width   | field                               |
/// |----------------|-------------------------|-------------------------------------|
/// | reported       | all nonzero             | w/10 × SID/SDD, h/10 × SID/SDD      |
/// | reported       | any zero                | square √(DAP/Dose RP)·100 × SID/SRD |
/// | not reported   | area reported, nonzero  | square √area·100 × SID/SDD          |
/// | not reported   | area absent or zero     | square √(DAP/Dose RP)·100 × SID/SRD |
///
/// SRD falls back to SID − `srd_offset_mm` when not reported. Under the
/// legacy profile no distance correction is applied.
pub fn field_size_at_isocenter(
    event: &IrradiationEvent,
    profile: FormulaProfile,
    srd_offset_mm: f64,
) -> Result<FieldSize> {
    let height = event.optional_number(COLLIMATED_FIELD_HEIGHT)?;
    let width = event.optional_number(COLLIMATED_FIELD_WIDTH)?;
    let area = event.optional_number(COLLIMATED_FIELD_AREA)?;
    let corrections = Corrections {
        event,
        enabled: profile.corrects_distances(),
        srd_offset_mm,
    };

    let field = match (width, height) {
        (Some(w), Some(h)) if w != 0.0 && h != 0.0 && area != Some(0.0) => {
            let cf = corrections.detector()?;
            FieldSize {
                width_cm: w / 10.0 * cf,
                height_cm: h / 10.0 * cf,
            }
        }
        (Some(_), Some(_)) => FieldSize::square(dap_side(event)? * corrections.reference_point()?),
        _ => match area {
            Some(a) if a != 0.0 => {
                if a < 0.0 {
                    return Err(NcirfError::invalid(COLLIMATED_FIELD_AREA, "negative area"));
                }
                FieldSize::square(a.sqrt() * 100.0 * corrections.detector()?)
            }
            _ => FieldSize::square(dap_side(event)? * corrections.reference_point()?),
        },
    };

    debug!(
        "Field at isocenter: {:.3} x {:.3} cm",
        field.width_cm, field.height_cm
    );
    Ok(field)
}

/// Side (cm) of the square field at the reference point implied by DAP
/// and reference point dose
fn dap_side(event: &IrradiationEvent) -> Result<f64> {
    let dap = event.number(DOSE_AREA_PRODUCT)?;
    let dose_rp = event.number(DOSE_RP)?;
    if dose_rp <= 0.0 {
        return Err(NcirfError::invalid(DOSE_RP, format!("{} Gy is not positive", dose_rp)));
    }
    if dap < 0.0 {
        return Err(NcirfError::invalid(DOSE_AREA_PRODUCT, "negative dose area product"));
    }
    Ok((dap / dose_rp).sqrt() * 100.0)
}

struct Corrections<'a> {
    event: &'a IrradiationEvent,
    enabled: bool,
    srd_offset_mm: f64,
}

impl Corrections<'_> {
    /// SID/SDD: detector plane to isocenter plane
    fn detector(&self) -> Result<f64> {
        if !self.enabled {
            return Ok(1.0);
        }
        let sid = self.sid()?;
        let sdd = self.event.number(DISTANCE_SOURCE_TO_DETECTOR)?;
        if sdd <= 0.0 {
            return Err(NcirfError::invalid(
                DISTANCE_SOURCE_TO_DETECTOR,
                format!("{} mm is not positive", sdd),
            ));
        }
        Ok(sid / sdd)
    }

    /// SID/SRD: reference point plane to isocenter plane
    fn reference_point(&self) -> Result<f64> {
        if !self.enabled {
            return Ok(1.0);
        }
        let sid = self.sid()?;
        let srd = match self.event.optional_number(DISTANCE_SOURCE_TO_REFERENCE_POINT)? {
            Some(srd) => srd,
            None => sid - self.srd_offset_mm,
        };
        if srd <= 0.0 {
            return Err(NcirfError::invalid(
                DISTANCE_SOURCE_TO_REFERENCE_POINT,
                format!("{} mm is not positive", srd),
            ));
        }
        Ok(sid / srd)
    }

    fn sid(&self) -> Result<f64> {
        self.event.number(DISTANCE_SOURCE_TO_ISOCENTER)
    }
}
