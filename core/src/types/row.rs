use serde::Serialize;

/// One line of the NCIRF batch input file
///
/// Field order is the column order of the batch file. Units: distances
/// and field sizes in cm, dose-area product in Gy·cm², angles in degrees,
/// isocenter in cm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NcirfRow {
    pub id: u64,
    pub arm_position: u8,
    pub phantom_age_group: u8,
    pub sex: u8,
    pub kvp: u32,
    pub hvl: f64,
    pub sid_cm: f64,
    pub field_width_cm: f64,
    pub field_height_cm: f64,
    pub dap: f64,
    pub primary_angle: f64,
    pub secondary_angle: f64,
    pub iso_x: f64,
    pub iso_y: f64,
    pub iso_z: f64,
    pub histories: u64,
    pub threads: u32,
}
