use crate::error::{NcirfError, Result};
use crate::report::parse_dicom_date;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::tags::concepts::DOSE_AREA_PRODUCT;

/// Scalar value of one extracted event parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    /// Numeric view of the value; numeric text is accepted
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            ParameterValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Flat parameter mapping of one irradiation event
///
/// Keys are concept names ("KVP", "Dose Area Product", ...). A parameter
/// reported twice keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IrradiationEvent {
    params: BTreeMap<String, ParameterValue>,
}

impl IrradiationEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) -> Option<ParameterValue> {
        let name = name.into();
        let previous = self.params.insert(name.clone(), value);
        if let Some(ref old) = previous {
            debug!("Parameter '{}' reported again, replacing '{}'", name, old);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required numeric parameter
    ///
    /// # Errors
    ///
    /// `MissingField` if absent, `InvalidValue` if not numeric.
    pub fn number(&self, name: &str) -> Result<f64> {
        self.optional_number(name)?
            .ok_or_else(|| NcirfError::MissingField(name.to_string()))
    }

    /// Optional numeric parameter; present but non-numeric is an error
    pub fn optional_number(&self, name: &str) -> Result<Option<f64>> {
        match self.params.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_number()
                .map(Some)
                .ok_or_else(|| NcirfError::invalid(name, format!("'{}' is not numeric", value))),
        }
    }

    /// Required textual parameter
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.params.get(name) {
            None => Err(NcirfError::MissingField(name.to_string())),
            Some(ParameterValue::Text(s)) => Ok(s.trim()),
            Some(value) => Err(NcirfError::invalid(
                name,
                format!("expected text, found {}", value),
            )),
        }
    }

    pub fn optional_text(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(ParameterValue::as_text)
            .map(str::trim)
    }

    /// Calendar date of a DA/DT parameter
    pub fn date(&self, name: &str) -> Result<NaiveDate> {
        let text = self.text(name)?;
        parse_dicom_date(text)
            .ok_or_else(|| NcirfError::invalid(name, format!("'{}' is not a date", text)))
    }

    /// Reported dose-area product in Gy·m², if present
    pub fn dose_area_product(&self) -> Result<Option<f64>> {
        self.optional_number(DOSE_AREA_PRODUCT)
    }

    /// Whether the event carries a non-zero dose-area product
    ///
    /// Events without one are excluded from the output batch.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the dose-area product is present but not numeric.
    pub fn has_dose(&self) -> Result<bool> {
        Ok(self.dose_area_product()?.is_some_and(|dap| dap != 0.0))
    }
}
