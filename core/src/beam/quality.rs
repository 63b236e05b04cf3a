use crate::error::{NcirfError, Result};
use crate::types::{FilterMaterial, FilterSpec};
use log::{debug, warn};

use super::table::HvlTable;

/// kVp values with pre-simulated beam qualities
pub const KVP_BUCKETS: [u32; 8] = [50, 60, 70, 80, 90, 100, 110, 120];

/// Pre-simulated HVL values (mm Al) per kVp bucket, ascending
pub fn catalog(kvp_bucket: u32) -> Option<&'static [f64]> {
    let hvls: &'static [f64] = match kvp_bucket {
        50 => &[1.89, 2.8, 3.3, 3.75],
        60 => &[2.25, 3.42],
        70 => &[2.61, 4.05, 6.83],
        80 => &[3.01, 4.61, 5.57, 6.38, 7.7],
        90 => &[3.38, 5.18],
        100 => &[3.75, 5.71],
        110 => &[4.11, 6.18, 7.33, 8.23, 9.68],
        120 => &[4.53, 6.52],
        _ => return None,
    };
    Some(hvls)
}

/// Beam quality as accepted by the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamQuality {
    /// kVp bucket
    pub kvp: u32,
    /// Catalog HVL (mm Al)
    pub hvl: f64,
}

/// Rounds a reported kVp to its bucket
///
/// Halfway values round to the even multiple of ten (85 → 80, 95 → 100).
/// Values outside the catalog clamp to the nearest bucket.
pub fn round_kvp(kvp: f64) -> Result<u32> {
    if !kvp.is_finite() || kvp <= 0.0 {
        return Err(NcirfError::invalid("KVP", format!("{} is not a tube voltage", kvp)));
    }
    let rounded = (kvp / 10.0).round_ties_even() * 10.0;
    let (min, max) = (KVP_BUCKETS[0], KVP_BUCKETS[KVP_BUCKETS.len() - 1]);
    let clamped = rounded.clamp(f64::from(min), f64::from(max));
    if clamped != rounded {
        warn!(
            "kVp {} rounds to {} outside [{}, {}], using {}",
            kvp, rounded, min, max, clamped
        );
    }
    Ok(clamped as u32)
}

/// Catalog HVL closest to `hvl`; the first entry wins ties
pub fn snap_to_catalog(options: &[f64], hvl: f64) -> Option<f64> {
    options.iter().copied().fold(None, |best, candidate| match best {
        Some(b) if (b - hvl).abs() <= (candidate - hvl).abs() => Some(b),
        _ => Some(candidate),
    })
}

/// Estimates the beam quality of an event from its kVp and filtration
///
/// The HVL is interpolated on the calibration grid at the reported
/// (thickness, kVp) and projected onto the bucket's catalog.
///
/// # Errors
///
/// - `UnsupportedFilter` for materials without calibration
/// - `OutOfCalibrationRange` when the point lies outside the grid
/// - `InvalidValue` for a non-physical kVp
pub fn estimate_beam_quality(kvp: f64, filter: &FilterSpec, table: &HvlTable) -> Result<BeamQuality> {
    let bucket = round_kvp(kvp)?;
    // The grid is measured behind copper
    let FilterMaterial::Copper = filter.material_kind()?;

    let interpolated = table.interpolate(filter.thickness, kvp)?;
    let options = bucket_catalog(bucket)?;
    let hvl = snap_to_catalog(options, interpolated).ok_or_else(|| {
        NcirfError::Calibration(format!("empty HVL catalog for {} kVp", bucket))
    })?;

    debug!(
        "kVp {} with {} -> interpolated HVL {:.3}, catalog {} kVp / {} mm Al",
        kvp, filter, interpolated, bucket, hvl
    );
    Ok(BeamQuality { kvp: bucket, hvl })
}

/// Beam quality without filter information: the bucket's lowest HVL
pub fn lowest_catalog_quality(kvp: f64) -> Result<BeamQuality> {
    let bucket = round_kvp(kvp)?;
    let hvl = bucket_catalog(bucket)?
        .first()
        .copied()
        .ok_or_else(|| NcirfError::Calibration(format!("empty HVL catalog for {} kVp", bucket)))?;
    Ok(BeamQuality { kvp: bucket, hvl })
}

fn bucket_catalog(bucket: u32) -> Result<&'static [f64]> {
    catalog(bucket)
        .ok_or_else(|| NcirfError::Calibration(format!("no HVL catalog for {} kVp", bucket)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn copper(thickness: f64) -> FilterSpec {
        FilterSpec::from_range("Copper or Copper compound", thickness, thickness).unwrap()
    }

    fn table() -> HvlTable {
        HvlTable::new(
            vec![0.0, 0.1, 0.2, 0.3],
            vec![50.0, 80.0, 120.0],
            vec![
                vec![1.8, 3.0, 4.5],
                vec![2.6, 4.2, 6.0],
                vec![3.2, 5.0, 7.0],
                vec![3.6, 5.6, 7.8],
            ],
        )
        .unwrap()
    }

    #[rstest]
    #[case(81.0, 80)]
    #[case(84.9, 80)]
    #[case(85.0, 80)]
    #[case(95.0, 100)]
    #[case(75.0, 80)]
    #[case(65.0, 60)]
    #[case(40.0, 50)]
    #[case(44.0, 50)]
    #[case(125.0, 120)]
    #[case(150.0, 120)]
    fn test_round_kvp(#[case] kvp: f64, #[case] expected: u32) {
        assert_eq!(round_kvp(kvp).unwrap(), expected);
    }

    #[test]
    fn test_round_kvp_rejects_nonsense() {
        assert!(round_kvp(f64::NAN).is_err());
        assert!(round_kvp(0.0).is_err());
    }

    #[test]
    fn test_every_bucket_has_catalog() {
        for bucket in KVP_BUCKETS {
            let options = catalog(bucket).unwrap();
            assert!(!options.is_empty());
            assert!(options.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(catalog(85).is_none());
    }

    #[rstest]
    #[case(&[3.01, 4.61, 5.57], 4.0, 4.61)]
    #[case(&[3.01, 4.61, 5.57], 0.0, 3.01)]
    #[case(&[3.01, 4.61, 5.57], 9.0, 5.57)]
    #[case(&[2.0, 4.0], 3.0, 2.0)]
    fn test_snap_to_catalog(#[case] options: &[f64], #[case] hvl: f64, #[case] expected: f64) {
        assert_eq!(snap_to_catalog(options, hvl), Some(expected));
    }

    #[test]
    fn test_snap_to_empty_catalog() {
        assert_eq!(snap_to_catalog(&[], 3.0), None);
    }

    #[test]
    fn test_estimate_reference_event() {
        // 0.2 mm Cu at 81 kVp interpolates to 5.05, closest to 4.61 at 80 kVp
        let quality = estimate_beam_quality(81.0, &copper(0.2), &table()).unwrap();
        assert_eq!(quality.kvp, 80);
        assert_eq!(quality.hvl, 4.61);
    }

    #[test]
    fn test_estimate_always_returns_catalog_value() {
        let table = table();
        for kvp in [50.0, 63.0, 77.0, 85.0, 99.0, 104.9, 115.0, 120.0] {
            for thickness in [0.0, 0.05, 0.1, 0.25, 0.3] {
                let quality = estimate_beam_quality(kvp, &copper(thickness), &table).unwrap();
                assert!(KVP_BUCKETS.contains(&quality.kvp));
                assert!(catalog(quality.kvp).unwrap().contains(&quality.hvl));
            }
        }
    }

    #[test]
    fn test_estimate_unsupported_material() {
        let aluminum = FilterSpec::from_range("Aluminum or Aluminum compound", 1.0, 1.0).unwrap();
        assert!(matches!(
            estimate_beam_quality(81.0, &aluminum, &table()),
            Err(NcirfError::UnsupportedFilter(_))
        ));
    }

    #[test]
    fn test_estimate_out_of_grid() {
        assert!(matches!(
            estimate_beam_quality(81.0, &copper(0.9), &table()),
            Err(NcirfError::OutOfCalibrationRange { .. })
        ));
    }

    #[test]
    fn test_lowest_catalog_quality() {
        assert_eq!(
            lowest_catalog_quality(81.0).unwrap(),
            BeamQuality { kvp: 80, hvl: 3.01 }
        );
        assert_eq!(
            lowest_catalog_quality(112.0).unwrap(),
            BeamQuality { kvp: 110, hvl: 4.11 }
        );
    }
}
