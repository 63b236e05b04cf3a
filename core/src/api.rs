use crate::beam::{estimate_beam_quality, lowest_catalog_quality, BeamQuality, HvlTable};
use crate::error::{NcirfError, Result};
use crate::extraction::concepts::{
    DATETIME_STARTED, DISTANCE_SOURCE_TO_ISOCENTER, DOSE_AREA_PRODUCT, KVP,
    POSITIONER_PRIMARY_ANGLE, POSITIONER_SECONDARY_ANGLE,
};
use crate::extraction::tags::{PATIENT_BIRTH_DATE, PATIENT_SEX, STUDY_DATE};
use crate::extraction::{extract_event, isolate_events, IrradiationEvent};
use crate::geometry::{field_size_at_isocenter, resolve_isocenter, IsocenterSource, ResolvedIsocenter};
use crate::report::{parse_dicom_date, Dataset};
use crate::types::{
    ArmPosition, ConversionConfig, EventErrorPolicy, FilterSpec, Isocenter, NcirfRow, PatientSex,
    PhantomAgeGroup,
};
use chrono::NaiveDate;
use dicom_core::Tag;
use log::{debug, info, warn};
use rayon::prelude::*;

/// Converts radiation dose structured reports into simulator batch rows
///
/// One converter holds the settings of one run; [`NcirfConverter::convert`]
/// can be called for any number of reports.
///
/// # Example
///
/// ```
/// use rdsr_ncirf_core::{ConversionConfig, FormulaProfile, NcirfConverter, PhantomAgeGroup};
/// use rdsr_ncirf_core::report::Dataset;
///
/// // A report without irradiation events
/// let report = Dataset::from_json_str(r#"{
///     "0040A730": {"vr": "SQ", "Value": []}
/// }"#).unwrap();
///
/// let config = ConversionConfig::default()
///     .with_profile(FormulaProfile::Legacy)
///     .with_age_group(PhantomAgeGroup::Adult);
///
/// let conversion = NcirfConverter::new(config).convert(&report).unwrap();
///
/// assert!(conversion.rows.is_empty());
/// assert_eq!(conversion.total_events, 0);
/// assert_eq!(conversion.phantom_age_group, PhantomAgeGroup::Adult);
/// ```
#[derive(Debug, Clone)]
pub struct NcirfConverter {
    config: ConversionConfig,
    hvl_table: Option<HvlTable>,
}

/// Values shared by every event of one document
struct DocumentContext {
    phantom_age_group: PhantomAgeGroup,
    sex: PatientSex,
    isocenter: Isocenter,
    threads: u32,
}

impl NcirfConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            hvl_table: None,
        }
    }

    /// Builder: Set the HVL calibration table
    pub fn with_hvl_table(mut self, table: HvlTable) -> Self {
        self.hvl_table = Some(table);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Extracts the parameter mapping of every irradiation event
    ///
    /// Events are returned in document order, including those without dose.
    ///
    /// # Errors
    ///
    /// Returns `MalformedReport` if the tree does not have the expected shape.
    pub fn extract_events(&self, report: &Dataset) -> Result<Vec<IrradiationEvent>> {
        isolate_events(report)?
            .iter()
            .map(|params| extract_event(params, self.config.profile))
            .collect()
    }

    /// Converts one report
    ///
    /// # Errors
    ///
    /// Document-level failures (malformed tree, missing birth date, no
    /// isocenter) are always returned. A failing event is skipped or
    /// returned as `EventFailed`, depending on the configured
    /// [`EventErrorPolicy`].
    pub fn convert(&self, report: &Dataset) -> Result<Conversion> {
        self.config.validate()?;
        if self.config.profile.interpolates_hvl() && self.hvl_table.is_none() {
            return Err(NcirfError::Calibration(format!(
                "the {} profile needs an HVL calibration table",
                self.config.profile
            )));
        }

        let events = self.extract_events(report)?;
        let sex = patient_sex(report);
        let phantom_age_group = self.phantom_age_group(report, &events)?;

        let mut dosed: Vec<(usize, &IrradiationEvent)> = Vec::with_capacity(events.len());
        let mut failures: Vec<(usize, Result<NcirfRow>)> = Vec::new();
        let mut zero_dose_events = 0;
        for (index, event) in events.iter().enumerate() {
            match event.has_dose() {
                Ok(true) => dosed.push((index, event)),
                Ok(false) => {
                    debug!("Event {} has no dose area product, excluded", index);
                    zero_dose_events += 1;
                }
                Err(e) => failures.push((index, Err(e))),
            }
        }

        let isocenter = match dosed.first() {
            Some((_, first)) => Some(self.document_isocenter(first, phantom_age_group)?),
            None => self.config.isocenter.map(|isocenter| ResolvedIsocenter {
                isocenter,
                source: IsocenterSource::Manual,
            }),
        };

        let mut conversion = Conversion {
            rows: Vec::with_capacity(dosed.len()),
            skipped: Vec::new(),
            zero_dose_events,
            total_events: events.len(),
            phantom_age_group,
            sex,
            isocenter: isocenter.clone(),
        };

        let mut results: Vec<(usize, Result<NcirfRow>)> = match (&isocenter, dosed.is_empty()) {
            (Some(resolved), false) => {
                let context = DocumentContext {
                    phantom_age_group,
                    sex,
                    isocenter: resolved.isocenter,
                    threads: self.config.resolved_threads(),
                };
                dosed
                    .par_iter()
                    .map(|(index, event)| (*index, self.assemble_row(event, &context)))
                    .collect()
            }
            _ => {
                info!("No irradiation events with dose in report");
                Vec::new()
            }
        };
        results.extend(failures);
        results.sort_by_key(|(index, _)| *index);

        for (index, result) in results {
            match result {
                Ok(row) => conversion.rows.push(row),
                Err(e) => match self.config.error_policy {
                    EventErrorPolicy::Abort => {
                        return Err(NcirfError::EventFailed {
                            index,
                            source: Box::new(e),
                        });
                    }
                    EventErrorPolicy::Skip => {
                        warn!(
                            "Skipping event {} ({}): {}",
                            index,
                            e.field().unwrap_or("no field"),
                            e
                        );
                        conversion.skipped.push(SkippedEvent {
                            index,
                            field: e.field().map(str::to_string),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            "Converted {} of {} events ({} without dose, {} skipped)",
            conversion.rows.len(),
            conversion.total_events,
            conversion.zero_dose_events,
            conversion.skipped.len()
        );
        Ok(conversion)
    }

    /// Builds the batch row of one event with dose
    fn assemble_row(&self, event: &IrradiationEvent, context: &DocumentContext) -> Result<NcirfRow> {
        let quality = self.beam_quality(event)?;
        let sid = event.number(DISTANCE_SOURCE_TO_ISOCENTER)?;
        let field = field_size_at_isocenter(
            event,
            self.config.profile,
            self.config.calibration.srd_offset_mm,
        )?;
        let dap = event.number(DOSE_AREA_PRODUCT)?;

        Ok(NcirfRow {
            id: self.config.patient_id,
            arm_position: self.config.arm_position.code(),
            phantom_age_group: context.phantom_age_group.number(),
            sex: context.sex.code(),
            kvp: quality.kvp,
            hvl: quality.hvl,
            sid_cm: sid / 10.0,
            field_width_cm: field.width_cm,
            field_height_cm: field.height_cm,
            // Gy·m² to Gy·cm²
            dap: dap * 10_000.0,
            primary_angle: event.number(POSITIONER_PRIMARY_ANGLE)?,
            secondary_angle: event.number(POSITIONER_SECONDARY_ANGLE)?,
            iso_x: context.isocenter.x,
            iso_y: context.isocenter.y,
            iso_z: context.isocenter.z,
            histories: self.config.histories,
            threads: context.threads,
        })
    }

    fn beam_quality(&self, event: &IrradiationEvent) -> Result<BeamQuality> {
        let kvp = event.number(KVP)?;
        match (&self.hvl_table, self.config.profile.interpolates_hvl()) {
            (Some(table), true) => {
                let filter = FilterSpec::from_event(event)?;
                estimate_beam_quality(kvp, &filter, table)
            }
            _ => lowest_catalog_quality(kvp),
        }
    }

    fn document_isocenter(
        &self,
        first: &IrradiationEvent,
        age_group: PhantomAgeGroup,
    ) -> Result<ResolvedIsocenter> {
        let resolved = resolve_isocenter(
            self.config.isocenter,
            first,
            age_group,
            &self.config.calibration,
        )?;
        if matches!(resolved.source, IsocenterSource::Preset(_))
            && self.config.arm_position != ArmPosition::Raised
        {
            warn!(
                "Isocenter preset assumes raised arms, but arm position is {}",
                self.config.arm_position
            );
        }
        info!("Isocenter {} from {}", resolved.isocenter, resolved.source);
        Ok(resolved)
    }

    /// Phantom age group of the patient at the exam
    ///
    /// A configured age group always wins. Otherwise the age is taken at
    /// the Study Date, or at the first event's start when the study has
    /// no date.
    fn phantom_age_group(
        &self,
        report: &Dataset,
        events: &[IrradiationEvent],
    ) -> Result<PhantomAgeGroup> {
        if let Some(age_group) = self.config.age_group {
            return Ok(age_group);
        }

        let birth_date = document_date(report, PATIENT_BIRTH_DATE, "Patient's Birth Date")?;
        let exam_date = match document_date(report, STUDY_DATE, "Study Date") {
            Ok(date) => date,
            Err(NcirfError::MissingField(_)) => events
                .first()
                .ok_or_else(|| NcirfError::MissingField("Study Date".to_string()))?
                .date(DATETIME_STARTED)?,
            Err(e) => return Err(e),
        };

        let age_group = PhantomAgeGroup::classify(exam_date, birth_date);
        debug!(
            "Patient born {} examined {}: phantom age group {}",
            birth_date, exam_date, age_group
        );
        Ok(age_group)
    }
}

fn document_date(report: &Dataset, tag: Tag, name: &str) -> Result<NaiveDate> {
    let text = report
        .text(tag)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NcirfError::MissingField(name.to_string()))?;
    parse_dicom_date(text).ok_or_else(|| NcirfError::invalid(name, format!("'{}' is not a date", text)))
}

fn patient_sex(report: &Dataset) -> PatientSex {
    match report.text(PATIENT_SEX).and_then(PatientSex::from_dicom) {
        Some(sex) => sex,
        None => {
            warn!(
                "Patient's Sex {:?} not recognized, using female phantom",
                report.text(PATIENT_SEX)
            );
            PatientSex::Female
        }
    }
}

/// Result of converting one report
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// One row per converted event, in document order
    pub rows: Vec<NcirfRow>,

    /// Events dropped under the skip policy
    pub skipped: Vec<SkippedEvent>,

    /// Events excluded for a zero or absent dose area product
    pub zero_dose_events: usize,

    /// Irradiation events found in the report
    pub total_events: usize,

    pub phantom_age_group: PhantomAgeGroup,

    pub sex: PatientSex,

    /// `None` when the report has no event with dose and no manual
    /// isocenter was given
    pub isocenter: Option<ResolvedIsocenter>,
}

/// Diagnostic for an event that could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    /// Position among the report's irradiation events, from 0
    pub index: usize,

    /// Parameter responsible, when known
    pub field: Option<String>,

    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BodyRegion;
    use crate::test_support::{
        code_item, event_container, filter_items, num_item, reference_event, report, text_item,
        with_params, without_params,
    };
    use crate::types::FormulaProfile;

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

    fn converter(config: ConversionConfig) -> NcirfConverter {
        NcirfConverter::new(config.with_patient_id(100001).with_threads(4)).with_hvl_table(table())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_reference_event() {
        let ds = report(
            Some("20100115"),
            Some("F"),
            vec![event_container(reference_event())],
        );

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert_eq!(conversion.rows.len(), 1);
        assert!(conversion.skipped.is_empty());
        let row = &conversion.rows[0];
        assert_eq!(row.id, 100001);
        assert_eq!(row.arm_position, 1);
        assert_eq!(row.phantom_age_group, 3);
        assert_eq!(row.sex, 1);
        assert_eq!(row.kvp, 80);
        assert_eq!(row.hvl, 4.61);
        assert_close(row.sid_cm, 75.0);
        // SRD = 750 - 150 mm
        let side = (2e-6_f64 / 0.01).sqrt() * 100.0 * 750.0 / 600.0;
        assert_close(row.field_width_cm, side);
        assert_close(row.field_height_cm, side);
        assert_close(row.dap, 0.02);
        assert_eq!(row.primary_angle, -8.9);
        assert_eq!(row.secondary_angle, 11.5);
        assert_eq!((row.iso_x, row.iso_y, row.iso_z), (26.0, 8.5, 66.0));
        assert_eq!(row.histories, 10_000_000);
        assert_eq!(row.threads, 4);

        let isocenter = conversion.isocenter.unwrap();
        assert_eq!(isocenter.source, IsocenterSource::Preset(BodyRegion::Abdomen));
    }

    #[test]
    fn test_zero_dose_event_has_no_row() {
        let zero = with_params(
            reference_event(),
            vec![("Dose Area Product", num_item("Dose Area Product", 0.0))],
        );
        let ds = report(Some("20100115"), Some("F"), vec![event_container(zero)]);

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert!(conversion.rows.is_empty());
        assert_eq!(conversion.zero_dose_events, 1);
        assert_eq!(conversion.total_events, 1);
        assert!(conversion.isocenter.is_none());
    }

    #[test]
    fn test_missing_dose_is_excluded() {
        let events = vec![
            event_container(without_params(reference_event(), &["Dose Area Product"])),
            event_container(reference_event()),
        ];
        let ds = report(Some("20100115"), Some("M"), events);

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert_eq!(conversion.rows.len(), 1);
        assert_eq!(conversion.zero_dose_events, 1);
        assert_eq!(conversion.rows[0].sex, 2);
    }

    fn non_numeric_dose_report() -> Dataset {
        let unreadable = with_params(
            reference_event(),
            vec![("Dose Area Product", text_item("Dose Area Product", "n/a"))],
        );
        report(
            Some("20100115"),
            Some("F"),
            vec![event_container(reference_event()), event_container(unreadable)],
        )
    }

    #[test]
    fn test_non_numeric_dose_is_skipped() {
        let conversion = converter(ConversionConfig::default())
            .convert(&non_numeric_dose_report())
            .unwrap();

        assert_eq!(conversion.rows.len(), 1);
        assert_eq!(conversion.zero_dose_events, 0);
        assert_eq!(conversion.skipped.len(), 1);
        assert_eq!(conversion.skipped[0].index, 1);
        assert_eq!(
            conversion.skipped[0].field.as_deref(),
            Some("Dose Area Product")
        );
    }

    #[test]
    fn test_non_numeric_dose_aborts() {
        let config = ConversionConfig::default().with_error_policy(EventErrorPolicy::Abort);
        let err = converter(config)
            .convert(&non_numeric_dose_report())
            .unwrap_err();

        match err {
            NcirfError::EventFailed { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source.field(), Some("Dose Area Product"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_only_non_numeric_dose_still_reported() {
        let unreadable = with_params(
            reference_event(),
            vec![("Dose Area Product", text_item("Dose Area Product", "n/a"))],
        );
        let ds = report(Some("20100115"), Some("F"), vec![event_container(unreadable)]);

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert!(conversion.rows.is_empty());
        assert!(conversion.isocenter.is_none());
        assert_eq!(conversion.zero_dose_events, 0);
        assert_eq!(conversion.skipped.len(), 1);
        assert_eq!(conversion.skipped[0].index, 0);
    }

    fn nonuniform_report() -> Dataset {
        let nonuniform = with_params(
            reference_event(),
            vec![("X-Ray Filters", filter_items("Copper or Copper compound", 0.2, 0.3))],
        );
        report(
            Some("20100115"),
            Some("F"),
            vec![
                event_container(reference_event()),
                event_container(nonuniform),
                event_container(reference_event()),
            ],
        )
    }

    #[test]
    fn test_nonuniform_filter_is_skipped() {
        let conversion = converter(ConversionConfig::default())
            .convert(&nonuniform_report())
            .unwrap();

        assert_eq!(conversion.rows.len(), 2);
        assert_eq!(
            conversion.skipped,
            vec![SkippedEvent {
                index: 1,
                field: Some("X-Ray Filter Thickness".to_string()),
                reason: NcirfError::NonuniformFilter { min: 0.2, max: 0.3 }.to_string(),
            }]
        );
    }

    #[test]
    fn test_nonuniform_filter_aborts() {
        let config = ConversionConfig::default().with_error_policy(EventErrorPolicy::Abort);
        let err = converter(config).convert(&nonuniform_report()).unwrap_err();

        match err {
            NcirfError::EventFailed { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, NcirfError::NonuniformFilter { .. }));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_missing_angle_is_skipped() {
        let ds = report(
            Some("20100115"),
            Some("F"),
            vec![event_container(without_params(
                reference_event(),
                &["Positioner Primary Angle"],
            ))],
        );

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert!(conversion.rows.is_empty());
        assert_eq!(conversion.skipped.len(), 1);
        assert_eq!(
            conversion.skipped[0].field.as_deref(),
            Some("Positioner Primary Angle")
        );
    }

    #[test]
    fn test_unsupported_filter_is_skipped() {
        let aluminum = with_params(
            reference_event(),
            vec![("X-Ray Filters", filter_items("Aluminum or Aluminum compound", 1.0, 1.0))],
        );
        let ds = report(Some("20100115"), Some("F"), vec![event_container(aluminum)]);

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        assert!(conversion.rows.is_empty());
        assert_eq!(
            conversion.skipped[0].field.as_deref(),
            Some("X-Ray Filter Material")
        );
    }

    #[test]
    fn test_unknown_region_aborts_document() {
        let pelvis = with_params(
            reference_event(),
            vec![("Target Region", code_item("Target Region", "Pelvis"))],
        );
        let ds = report(Some("20100115"), Some("F"), vec![event_container(pelvis)]);

        let err = converter(ConversionConfig::default()).convert(&ds).unwrap_err();
        assert!(matches!(err, NcirfError::InvalidRegionOrAge { age_group: 3, .. }));
    }

    #[test]
    fn test_manual_isocenter_overrides_region() {
        let pelvis = with_params(
            reference_event(),
            vec![("Target Region", code_item("Target Region", "Pelvis"))],
        );
        let ds = report(Some("20100115"), Some("F"), vec![event_container(pelvis)]);
        let config = ConversionConfig::default().with_isocenter(Isocenter::new(20.0, 9.0, 70.0));

        let conversion = converter(config).convert(&ds).unwrap();

        let row = &conversion.rows[0];
        assert_eq!((row.iso_x, row.iso_y, row.iso_z), (20.0, 9.0, 70.0));
    }

    #[test]
    fn test_missing_birth_date() {
        let ds = report(None, Some("F"), vec![event_container(reference_event())]);

        let err = converter(ConversionConfig::default()).convert(&ds).unwrap_err();
        assert!(matches!(err, NcirfError::MissingField(ref f) if f == "Patient's Birth Date"));

        let config = ConversionConfig::default().with_age_group(PhantomAgeGroup::Adult);
        let conversion = converter(config).convert(&ds).unwrap();
        assert_eq!(conversion.rows[0].phantom_age_group, 6);
        assert_eq!(conversion.rows[0].iso_z, 105.0);
    }

    #[test]
    fn test_missing_sex_defaults_to_female() {
        let ds = report(Some("20100115"), None, vec![event_container(reference_event())]);
        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();
        assert_eq!(conversion.sex, PatientSex::Female);
        assert_eq!(conversion.rows[0].sex, 1);
    }

    #[test]
    fn test_legacy_profile() {
        let ds = report(
            Some("20100115"),
            Some("F"),
            vec![event_container(reference_event())],
        );
        let config = ConversionConfig::default().with_profile(FormulaProfile::Legacy);

        let conversion = NcirfConverter::new(config).convert(&ds).unwrap();

        let row = &conversion.rows[0];
        assert_eq!(row.kvp, 80);
        assert_eq!(row.hvl, 3.01);
        assert_close(row.field_width_cm, (2e-4_f64).sqrt() * 100.0);
    }

    #[test]
    fn test_corrected_profile_requires_table() {
        let ds = report(Some("20100115"), Some("F"), vec![]);
        let err = NcirfConverter::new(ConversionConfig::default())
            .convert(&ds)
            .unwrap_err();
        assert!(matches!(err, NcirfError::Calibration(_)));
    }

    #[test]
    fn test_rows_keep_document_order() {
        let events = (0..12_i32)
            .map(|i| {
                event_container(with_params(
                    reference_event(),
                    vec![(
                        "Positioner Primary Angle",
                        num_item("Positioner Primary Angle", f64::from(i)),
                    )],
                ))
            })
            .collect();
        let ds = report(Some("20100115"), Some("F"), events);

        let conversion = converter(ConversionConfig::default()).convert(&ds).unwrap();

        let angles: Vec<f64> = conversion.rows.iter().map(|r| r.primary_angle).collect();
        assert_eq!(angles, (0..12_i32).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_extract_events() {
        let ds = report(
            Some("20100115"),
            Some("F"),
            vec![event_container(reference_event())],
        );
        let events = converter(ConversionConfig::default())
            .extract_events(&ds)
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].number("KVP").unwrap(), 81.0);
        assert_eq!(events[0].text("Target Region").unwrap(), "Abdomen");
    }
}
