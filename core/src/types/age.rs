use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Age-matched phantom used by the simulator
///
/// Groups are numbered 1–6 in the batch file:
/// <1, [1,5), [5,10), [10,15), [15,18), ≥18 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PhantomAgeGroup {
    Newborn,
    OneYear,
    FiveYear,
    TenYear,
    FifteenYear,
    Adult,
}

impl PhantomAgeGroup {
    pub const ALL: [PhantomAgeGroup; 6] = [
        PhantomAgeGroup::Newborn,
        PhantomAgeGroup::OneYear,
        PhantomAgeGroup::FiveYear,
        PhantomAgeGroup::TenYear,
        PhantomAgeGroup::FifteenYear,
        PhantomAgeGroup::Adult,
    ];

    /// Classifies an exam by patient age
    pub fn classify(exam_date: NaiveDate, birth_date: NaiveDate) -> Self {
        Self::from_age(age_in_years(exam_date, birth_date))
    }

    /// Buckets an age in whole years
    pub fn from_age(years: i32) -> Self {
        match years {
            i32::MIN..=0 => PhantomAgeGroup::Newborn,
            1..=4 => PhantomAgeGroup::OneYear,
            5..=9 => PhantomAgeGroup::FiveYear,
            10..=14 => PhantomAgeGroup::TenYear,
            15..=17 => PhantomAgeGroup::FifteenYear,
            _ => PhantomAgeGroup::Adult,
        }
    }

    /// Group number (1–6)
    pub fn number(&self) -> u8 {
        match self {
            PhantomAgeGroup::Newborn => 1,
            PhantomAgeGroup::OneYear => 2,
            PhantomAgeGroup::FiveYear => 3,
            PhantomAgeGroup::TenYear => 4,
            PhantomAgeGroup::FifteenYear => 5,
            PhantomAgeGroup::Adult => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        n.checked_sub(1)
            .and_then(|i| Self::ALL.get(usize::from(i)))
            .copied()
    }
}

/// Age in whole years, minus one if the birthday has not yet occurred
/// in the exam year
pub fn age_in_years(exam_date: NaiveDate, birth_date: NaiveDate) -> i32 {
    let before_birthday =
        (exam_date.month(), exam_date.day()) < (birth_date.month(), birth_date.day());
    exam_date.year() - birth_date.year() - i32::from(before_birthday)
}

impl TryFrom<u8> for PhantomAgeGroup {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("phantom age group must be 1-6, got {}", n))
    }
}

impl From<PhantomAgeGroup> for u8 {
    fn from(group: PhantomAgeGroup) -> Self {
        group.number()
    }
}

impl fmt::Display for PhantomAgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
