use crate::error::{NcirfError, Result};
use crate::geometry::CalibrationData;
use crate::types::{ArmPosition, EventErrorPolicy, FormulaProfile, Isocenter, PhantomAgeGroup};
use serde::{Deserialize, Serialize};

/// Default number of photon histories simulated per irradiation event
pub const DEFAULT_HISTORIES: u64 = 10_000_000;

/// Per-document conversion settings
///
/// Everything the simulator needs that the report itself does not carry.
///
/// # Example
///
/// ```
/// use rdsr_ncirf_core::{ArmPosition, ConversionConfig, Isocenter};
///
/// let config = ConversionConfig::default()
///     .with_patient_id(100001)
///     .with_arm_position(ArmPosition::Lowered)
///     .with_isocenter(Isocenter::new(19.5, 7.5, 40.0))
///     .with_threads(8);
///
/// assert_eq!(config.histories, 10_000_000);
/// assert_eq!(config.resolved_threads(), 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Patient/study identifier written to the first column
    pub patient_id: u64,

    /// Phantom arm posture
    pub arm_position: ArmPosition,

    /// Photon histories per event
    pub histories: u64,

    /// Simulation threads; `None` uses the physical core count
    pub threads: Option<u32>,

    /// Manually chosen isocenter, overriding device and preset lookup
    pub isocenter: Option<Isocenter>,

    /// Phantom age group, overriding the one derived from the report
    pub age_group: Option<PhantomAgeGroup>,

    /// Formula generation
    pub profile: FormulaProfile,

    /// Handling of events that fail to convert
    pub error_policy: EventErrorPolicy,

    /// Empirical geometry constants
    pub calibration: CalibrationData,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            patient_id: 0,
            arm_position: ArmPosition::default(),
            histories: DEFAULT_HISTORIES,
            threads: None,
            isocenter: None,
            age_group: None,
            profile: FormulaProfile::default(),
            error_policy: EventErrorPolicy::default(),
            calibration: CalibrationData::default(),
        }
    }
}

impl ConversionConfig {
    /// Builder: Set patient identifier
    pub fn with_patient_id(mut self, id: u64) -> Self {
        self.patient_id = id;
        self
    }

    /// Builder: Set arm position
    pub fn with_arm_position(mut self, arm_position: ArmPosition) -> Self {
        self.arm_position = arm_position;
        self
    }

    /// Builder: Set photon histories per event
    pub fn with_histories(mut self, histories: u64) -> Self {
        self.histories = histories;
        self
    }

    /// Builder: Set simulation thread count
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Builder: Set a manual isocenter
    pub fn with_isocenter(mut self, isocenter: Isocenter) -> Self {
        self.isocenter = Some(isocenter);
        self
    }

    /// Builder: Force the phantom age group
    pub fn with_age_group(mut self, age_group: PhantomAgeGroup) -> Self {
        self.age_group = Some(age_group);
        self
    }

    /// Builder: Select the formula profile
    pub fn with_profile(mut self, profile: FormulaProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Builder: Select the event error policy
    pub fn with_error_policy(mut self, policy: EventErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Builder: Replace calibration constants
    pub fn with_calibration(mut self, calibration: CalibrationData) -> Self {
        self.calibration = calibration;
        self
    }

    /// Thread count written to the batch file
    pub fn resolved_threads(&self) -> u32 {
        self.threads
            .unwrap_or_else(|| u32::try_from(num_cpus::get_physical()).unwrap_or(u32::MAX))
    }

    /// Checks value ranges the type system does not enforce
    pub fn validate(&self) -> Result<()> {
        if self.histories == 0 {
            return Err(NcirfError::invalid("histories", "must be positive"));
        }
        if self.threads == Some(0) {
            return Err(NcirfError::invalid("threads", "must be positive"));
        }
        if let Some(iso) = self.isocenter {
            if !iso.is_finite() {
                return Err(NcirfError::invalid("isocenter", format!("{} is not finite", iso)));
            }
        }
        let offset = self.calibration.srd_offset_mm;
        if !offset.is_finite() || offset < 0.0 {
            return Err(NcirfError::invalid(
                "srd_offset_mm",
                format!("{} is not a valid distance", offset),
            ));
        }
        Ok(())
    }
}
