use thiserror::Error;

/// Result type for RDSR conversion operations
pub type Result<T> = std::result::Result<T, NcirfError>;

/// Error types for RDSR to NCIRF conversion
#[derive(Error, Debug)]
pub enum NcirfError {
    /// The report tree does not have the shape the navigator relies on
    #[error("Malformed report: {0}")]
    MalformedReport(String),

    /// X-ray filter material has no HVL calibration
    #[error("Unsupported X-ray filter material: {0}")]
    UnsupportedFilter(String),

    /// Minimum and maximum filter thickness differ
    #[error("X-ray filter is not flat: minimum thickness {min} mm, maximum thickness {max} mm")]
    NonuniformFilter { min: f64, max: f64 },

    /// No preset isocenter for the region / age group combination
    #[error("Invalid target region or phantom age group: {region}, {age_group}")]
    InvalidRegionOrAge { region: String, age_group: u8 },

    /// Required field absent with no fallback
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Field present but unusable
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// HVL lookup outside the calibration grid
    #[error("HVL lookup outside calibration table: thickness {thickness} mm, {kvp} kVp")]
    OutOfCalibrationRange { thickness: f64, kvp: f64 },

    /// Calibration table or calibration data could not be used
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// A single irradiation event failed under the abort policy
    #[error("Irradiation event {index} failed: {source}")]
    EventFailed {
        index: usize,
        #[source]
        source: Box<NcirfError>,
    },

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// DICOM JSON or configuration parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NcirfError {
    /// Shorthand for [`NcirfError::InvalidValue`]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NcirfError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the event parameter responsible for the failure, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            NcirfError::MissingField(field) => Some(field),
            NcirfError::InvalidValue { field, .. } => Some(field),
            NcirfError::UnsupportedFilter(_) => Some("X-Ray Filter Material"),
            NcirfError::NonuniformFilter { .. } => Some("X-Ray Filter Thickness"),
            NcirfError::OutOfCalibrationRange { .. } => Some("KVP"),
            NcirfError::InvalidRegionOrAge { .. } => Some("Target Region"),
            NcirfError::EventFailed { source, .. } => source.field(),
            _ => None,
        }
    }
}

// Helper conversions
impl From<String> for NcirfError {
    fn from(s: String) -> Self {
        NcirfError::MalformedReport(s)
    }
}

impl From<&str> for NcirfError {
    fn from(s: &str) -> Self {
        NcirfError::MalformedReport(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for NcirfError {
    fn from(e: dicom_object::ReadError) -> Self {
        NcirfError::DicomError(format!("{}", e))
    }
}
