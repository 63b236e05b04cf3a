use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Parses the calendar date of a DICOM DA or DT value
///
/// Accepts:
/// - DA: "20191115"
/// - DT: "20191115101520.123456+0100" (time and offset are ignored)
/// - Dashed form some exporters emit: "2019-11-15"
///
/// Returns `None` for empty strings, partial dates and invalid dates.
pub fn parse_dicom_date(s: &str) -> Option<NaiveDate> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d{4})-?(\d{2})-?(\d{2})").expect("Failed to compile regex")
    });

    let caps = re.captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
