use crate::error::{NcirfError, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Half-value-layer calibration grid for one filter material
///
/// Rows are filter thicknesses (mm), columns are tube voltages (kVp),
/// cells are HVL values (mm Al).
#[derive(Debug, Clone, PartialEq)]
pub struct HvlTable {
    thicknesses: Vec<f64>,
    kvps: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl HvlTable {
    /// Builds a table from its axes and cell grid
    ///
    /// # Errors
    ///
    /// Returns `Calibration` if an axis has fewer than two points, is not
    /// strictly increasing, or the grid does not match the axes.
    pub fn new(thicknesses: Vec<f64>, kvps: Vec<f64>, values: Vec<Vec<f64>>) -> Result<Self> {
        check_axis("thickness", &thicknesses)?;
        check_axis("kVp", &kvps)?;

        if values.len() != thicknesses.len() {
            return Err(NcirfError::Calibration(format!(
                "{} thickness rows for {} thickness values",
                values.len(),
                thicknesses.len()
            )));
        }
        if let Some((i, row)) = values.iter().enumerate().find(|(_, r)| r.len() != kvps.len()) {
            return Err(NcirfError::Calibration(format!(
                "row {} has {} HVL values, expected {}",
                i + 1,
                row.len(),
                kvps.len()
            )));
        }

        Ok(Self {
            thicknesses,
            kvps,
            values,
        })
    }

    /// Loads a table from a CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let table = Self::from_reader(File::open(path)?)?;
        debug!(
            "Loaded HVL table {:?}: {} thicknesses x {} kVps",
            path,
            table.thicknesses.len(),
            table.kvps.len()
        );
        Ok(table)
    }

    /// Parses a table from CSV text
    ///
    /// The first header cell is a label; the remaining header cells are the
    /// kVp axis. Every following record is a thickness followed by one HVL
    /// per kVp.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let kvps = csv_reader
            .headers()?
            .iter()
            .skip(1)
            .map(|cell| parse_cell(cell, "kVp header"))
            .collect::<Result<Vec<_>>>()?;

        let mut thicknesses = Vec::new();
        let mut values = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut cells = record.iter();
            let Some(first) = cells.next() else {
                continue;
            };
            thicknesses.push(parse_cell(first, "thickness")?);
            values.push(
                cells
                    .map(|cell| parse_cell(cell, "HVL"))
                    .collect::<Result<Vec<_>>>()?,
            );
        }

        Self::new(thicknesses, kvps, values)
    }

    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    pub fn kvps(&self) -> &[f64] {
        &self.kvps
    }

    /// Bilinear interpolation of the HVL at (thickness, kVp)
    ///
    /// # Errors
    ///
    /// Returns `OutOfCalibrationRange` if the point lies outside the grid.
    pub fn interpolate(&self, thickness: f64, kvp: f64) -> Result<f64> {
        let out_of_range = || NcirfError::OutOfCalibrationRange { thickness, kvp };
        let (i, ti) = locate(&self.thicknesses, thickness).ok_or_else(out_of_range)?;
        let (j, tj) = locate(&self.kvps, kvp).ok_or_else(out_of_range)?;

        let v00 = self.values[i][j];
        let v01 = self.values[i][j + 1];
        let v10 = self.values[i + 1][j];
        let v11 = self.values[i + 1][j + 1];

        let low = v00 + (v01 - v00) * tj;
        let high = v10 + (v11 - v10) * tj;
        Ok(low + (high - low) * ti)
    }
}

fn check_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.len() < 2 {
        return Err(NcirfError::Calibration(format!(
            "{} axis needs at least two values, found {}",
            name,
            axis.len()
        )));
    }
    if axis.windows(2).any(|w| !(w[0] < w[1])) {
        return Err(NcirfError::Calibration(format!(
            "{} axis is not strictly increasing",
            name
        )));
    }
    Ok(())
}

fn parse_cell(cell: &str, what: &str) -> Result<f64> {
    cell.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NcirfError::Calibration(format!("invalid {} value '{}'", what, cell)))
}

/// Cell index and fractional position of `x` on a strictly increasing axis
///
/// Returns `None` outside `[first, last]`. The upper bound maps onto the
/// last cell with fraction 1.
fn locate(axis: &[f64], x: f64) -> Option<(usize, f64)> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    if !(x >= first && x <= last) {
        return None;
    }
    let upper = axis.partition_point(|&a| a <= x);
    let i = upper.saturating_sub(1).min(axis.len() - 2);
    let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
    Some((i, t))
}
