pub mod report;

use crate::error::Result;
use crate::geometry::CalibrationData;
use crate::types::{
    ArmPosition, ConversionConfig, EventErrorPolicy, FormulaProfile, Isocenter, PhantomAgeGroup,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for rdsr2ncirf
#[derive(Parser, Debug)]
#[command(name = "rdsr2ncirf")]
#[command(about = "Convert X-ray radiation dose structured reports into NCIRF batch files")]
#[command(version)]
pub struct Cli {
    /// Path to the dose report (DICOM, or DICOM JSON with a .json extension)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// HVL calibration table (CSV: thickness rows, kVp columns)
    #[arg(long, value_name = "CSV")]
    pub hvl_table: Option<PathBuf>,

    /// Phantom arm position
    #[arg(short, long, default_value = "raised")]
    pub arm: ArmPositionArg,

    /// Patient or study identifier written to the first column
    #[arg(long, default_value_t = 0)]
    pub patient_id: u64,

    /// Photon histories per irradiation event
    #[arg(long, default_value_t = crate::types::DEFAULT_HISTORIES)]
    pub histories: u64,

    /// Simulation threads (default: physical core count)
    #[arg(long)]
    pub threads: Option<u32>,

    /// Isocenter in cm, overriding device and region lookup
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub iso: Option<Vec<f64>>,

    /// Phantom age group (1-6), overriding the patient's age
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub age_group: Option<u8>,

    /// Formula generation
    #[arg(long, default_value = "corrected")]
    pub profile: ProfileArg,

    /// Geometry calibration constants (JSON)
    #[arg(long, value_name = "JSON")]
    pub calibration: Option<PathBuf>,

    /// Fail on the first event that cannot be converted
    #[arg(long)]
    pub strict: bool,

    /// Output batch file (default: input path with .csv extension)
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Print every extracted irradiation event as JSON
    #[arg(long)]
    pub dump_events: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion settings selected on the command line
    pub fn conversion_config(&self) -> Result<ConversionConfig> {
        let calibration = match &self.calibration {
            Some(path) => CalibrationData::from_json_file(path)?,
            None => CalibrationData::default(),
        };

        let mut config = ConversionConfig::default()
            .with_patient_id(self.patient_id)
            .with_arm_position(self.arm.clone().into())
            .with_histories(self.histories)
            .with_profile(self.profile.clone().into())
            .with_error_policy(if self.strict {
                EventErrorPolicy::Abort
            } else {
                EventErrorPolicy::Skip
            })
            .with_calibration(calibration);

        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if let Some([x, y, z]) = self.iso.as_deref() {
            config = config.with_isocenter(Isocenter::new(*x, *y, *z));
        }
        if let Some(age_group) = self.age_group.and_then(PhantomAgeGroup::from_number) {
            config = config.with_age_group(age_group);
        }

        config.validate()?;
        Ok(config)
    }

    /// Output path, defaulting to the input with a .csv extension
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.file.with_extension("csv"))
    }
}

/// Phantom arm position
#[derive(Debug, Clone, ValueEnum)]
pub enum ArmPositionArg {
    /// Arms raised above the head
    Raised,
    /// Arms along the body
    Lowered,
    /// Arms rotated
    Rotated,
}

impl From<ArmPositionArg> for ArmPosition {
    fn from(arg: ArmPositionArg) -> Self {
        match arg {
            ArmPositionArg::Raised => ArmPosition::Raised,
            ArmPositionArg::Lowered => ArmPosition::Lowered,
            ArmPositionArg::Rotated => ArmPosition::Rotated,
        }
    }
}

/// Formula generation
#[derive(Debug, Clone, ValueEnum)]
pub enum ProfileArg {
    /// Interpolated HVL, field sizes corrected to the isocenter plane
    Corrected,
    /// Lowest catalog HVL, uncorrected field sizes
    Legacy,
}

impl From<ProfileArg> for FormulaProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Corrected => FormulaProfile::Corrected,
            ProfileArg::Legacy => FormulaProfile::Legacy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rdsr2ncirf", "study/AS_XA.dcm"]).unwrap();
        let config = cli.conversion_config().unwrap();

        assert_eq!(config, ConversionConfig::default());
        assert_eq!(cli.output_path(), Path::new("study/AS_XA.csv"));
        assert!(!cli.dump_events);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "rdsr2ncirf",
            "report.json",
            "--hvl-table",
            "hvl_copper_filter.csv",
            "--arm",
            "lowered",
            "--patient-id",
            "100001",
            "--histories",
            "1000",
            "--threads",
            "8",
            "--iso",
            "19.5",
            "-7.5",
            "40",
            "--age-group",
            "2",
            "--profile",
            "legacy",
            "--strict",
            "--output",
            "batch.csv",
        ])
        .unwrap();
        let config = cli.conversion_config().unwrap();

        assert_eq!(config.patient_id, 100001);
        assert_eq!(config.arm_position, ArmPosition::Lowered);
        assert_eq!(config.histories, 1000);
        assert_eq!(config.threads, Some(8));
        assert_eq!(config.isocenter, Some(Isocenter::new(19.5, -7.5, 40.0)));
        assert_eq!(config.age_group, Some(PhantomAgeGroup::OneYear));
        assert_eq!(config.profile, FormulaProfile::Legacy);
        assert_eq!(config.error_policy, EventErrorPolicy::Abort);
        assert_eq!(cli.hvl_table.as_deref(), Some(Path::new("hvl_copper_filter.csv")));
        assert_eq!(cli.output_path(), Path::new("batch.csv"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["rdsr2ncirf", "r.dcm", "--age-group", "7"]).is_err());
        assert!(Cli::try_parse_from(["rdsr2ncirf", "r.dcm", "--arm", "up"]).is_err());
        assert!(Cli::try_parse_from(["rdsr2ncirf", "r.dcm", "--iso", "1", "2"]).is_err());
    }

    #[test]
    fn test_zero_histories_fail_validation() {
        let cli = Cli::try_parse_from(["rdsr2ncirf", "r.dcm", "--histories", "0"]).unwrap();
        assert!(cli.conversion_config().is_err());
    }
}
