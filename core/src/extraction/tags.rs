use dicom_core::Tag;
use dicom_dictionary_std::tags;

// Document-level Tags
pub const STUDY_DATE: Tag = tags::STUDY_DATE;
pub const PATIENT_BIRTH_DATE: Tag = tags::PATIENT_BIRTH_DATE;
pub const PATIENT_SEX: Tag = tags::PATIENT_SEX;

// SR Content Item Tags
pub const RELATIONSHIP_TYPE: Tag = tags::RELATIONSHIP_TYPE;
pub const VALUE_TYPE: Tag = tags::VALUE_TYPE;
pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = tags::CONCEPT_NAME_CODE_SEQUENCE;
pub const CONTINUITY_OF_CONTENT: Tag = tags::CONTINUITY_OF_CONTENT;
pub const CONTENT_SEQUENCE: Tag = tags::CONTENT_SEQUENCE;
pub const CONCEPT_CODE_SEQUENCE: Tag = tags::CONCEPT_CODE_SEQUENCE;
pub const MEASURED_VALUE_SEQUENCE: Tag = tags::MEASURED_VALUE_SEQUENCE;
pub const TEXT_VALUE: Tag = tags::TEXT_VALUE;
pub const DATE_TIME: Tag = tags::DATE_TIME;

// Code Sequence Item Tags
pub const CODE_VALUE: Tag = tags::CODE_VALUE;
pub const CODING_SCHEME_DESIGNATOR: Tag = tags::CODING_SCHEME_DESIGNATOR;
pub const CODE_MEANING: Tag = tags::CODE_MEANING;

// Measured Value Item Tags
pub const MEASUREMENT_UNITS_CODE_SEQUENCE: Tag = tags::MEASUREMENT_UNITS_CODE_SEQUENCE;
pub const NUMERIC_VALUE: Tag = tags::NUMERIC_VALUE;

/// Concept names of irradiation event parameters, as they appear in the
/// Code Meaning of each content item
pub mod concepts {
    pub const DOSE_AREA_PRODUCT: &str = "Dose Area Product";
    pub const DOSE_RP: &str = "Dose (RP)";
    pub const KVP: &str = "KVP";
    pub const DATETIME_STARTED: &str = "DateTime Started";
    pub const TARGET_REGION: &str = "Target Region";
    pub const DEVICE_NAME: &str = "Device Name";

    // Filter
    pub const XRAY_FILTERS: &str = "X-Ray Filters";
    pub const FILTER_MATERIAL: &str = "X-Ray Filter Material";
    pub const FILTER_THICKNESS_MIN: &str = "X-Ray Filter Thickness Minimum";
    pub const FILTER_THICKNESS_MAX: &str = "X-Ray Filter Thickness Maximum";

    // Distances (mm)
    pub const DISTANCE_SOURCE_TO_ISOCENTER: &str = "Distance Source to Isocenter";
    pub const DISTANCE_SOURCE_TO_DETECTOR: &str = "Distance Source to Detector";
    pub const DISTANCE_SOURCE_TO_REFERENCE_POINT: &str = "Distance Source to Reference Point";

    // Collimation (height/width in mm, area in m2)
    pub const COLLIMATED_FIELD_AREA: &str = "Collimated Field Area";
    pub const COLLIMATED_FIELD_HEIGHT: &str = "Collimated Field Height";
    pub const COLLIMATED_FIELD_WIDTH: &str = "Collimated Field Width";

    // Positioner (degrees)
    pub const POSITIONER_PRIMARY_ANGLE: &str = "Positioner Primary Angle";
    pub const POSITIONER_SECONDARY_ANGLE: &str = "Positioner Secondary Angle";

    // Table and beam position sensors (mm)
    pub const TABLE_LATERAL_POSITION: &str = "Table Lateral Position";
    pub const TABLE_HEIGHT_POSITION: &str = "Table Height Position";
    pub const TABLE_LONGITUDINAL_POSITION: &str = "Table Longitudinal Position";
    pub const LATERAL_BEAM_POSITION: &str = "Lateral Beam Position";
    pub const LONGITUDINAL_BEAM_POSITION: &str = "Longitudinal Beam Position";
}
