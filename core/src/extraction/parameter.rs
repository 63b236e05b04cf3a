use crate::error::{NcirfError, Result};
use crate::report::{Dataset, ElementValue};
use crate::types::FormulaProfile;
use log::debug;

use super::event::{IrradiationEvent, ParameterValue};
use super::tags::{CODE_MEANING, CONCEPT_NAME_CODE_SEQUENCE, NUMERIC_VALUE};

/// Concepts whose five-element items list several parameters rather than
/// qualifying a single one
pub const COMPOSITE_CONCEPTS: &[&str] = &["X-Ray Filters"];

/// Layout of one content item, recognized by its element count
///
/// The report does not tag these layouts explicitly; the element count is
/// what tells them apart:
/// - 4 elements: relationship, value type, concept name, value
/// - 5 elements: as above plus a content sequence (or continuity flag)
/// - 6 elements: value plus continuity flag plus content sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    /// Value container holds the value directly
    Scalar,
    /// Last element holds one item carrying the actual value
    Nested,
    /// Last element holds several items, each a parameter of its own
    Composite,
    /// Any other element count
    Unrecognized(usize),
}

impl ItemShape {
    /// Classifies a content item
    ///
    /// Five-element items are composite only for concepts listed in
    /// [`COMPOSITE_CONCEPTS`], and only when the profile expands them.
    pub fn of(item: &Dataset, profile: FormulaProfile) -> Result<Self> {
        Ok(match item.len() {
            4 => ItemShape::Scalar,
            5 => {
                let name = concept_name(item)?;
                if profile.expands_composite_concepts() && COMPOSITE_CONCEPTS.contains(&name) {
                    ItemShape::Composite
                } else {
                    ItemShape::Nested
                }
            }
            6 => ItemShape::Composite,
            n => ItemShape::Unrecognized(n),
        })
    }
}

/// Builds the flat parameter mapping of one irradiation event
///
/// # Errors
///
/// Returns `MalformedReport` for items of unrecognized shape or without
/// a readable concept name or value.
pub fn extract_event(params: &[&Dataset], profile: FormulaProfile) -> Result<IrradiationEvent> {
    let mut event = IrradiationEvent::new();
    for item in params {
        extract_into(item, profile, &mut event)?;
    }
    Ok(event)
}

fn extract_into(item: &Dataset, profile: FormulaProfile, event: &mut IrradiationEvent) -> Result<()> {
    match ItemShape::of(item, profile)? {
        ItemShape::Scalar => {
            let (name, value) = extract_parameter(item)?;
            event.insert(name, value);
        }
        ItemShape::Nested => {
            let child = value_items(item)?.into_iter().next().ok_or_else(|| {
                NcirfError::MalformedReport(format!(
                    "nested item '{}' has no child item",
                    concept_name(item).unwrap_or("?")
                ))
            })?;
            let (name, value) = extract_parameter(child)?;
            event.insert(name, value);
        }
        ItemShape::Composite => {
            for child in value_items(item)? {
                let (name, value) = extract_parameter(child)?;
                event.insert(name, value);
            }
        }
        ItemShape::Unrecognized(n) => {
            return Err(NcirfError::MalformedReport(format!(
                "content item has {} elements, expected 4, 5 or 6",
                n
            )));
        }
    }
    Ok(())
}

/// Reads the (concept name, value) pair of one content item
///
/// The value container is the item's last element. Within it:
/// - no value at all: the element's VR stands in as text
/// - a 3-element item: a code, its Code Meaning is the value
/// - a 2-element item: a measurement, its Numeric Value is the value
/// - anything else: the first raw value
pub fn extract_parameter(item: &Dataset) -> Result<(String, ParameterValue)> {
    let name = concept_name(item)?.to_string();
    let (_, container) = item
        .last()
        .ok_or_else(|| NcirfError::MalformedReport("empty content item".to_string()))?;

    let Some(first) = container.first_value() else {
        debug!("Parameter '{}' carries no value", name);
        return Ok((name, ParameterValue::Text(container.vr.clone())));
    };

    let value = match first {
        ElementValue::Item(inner) if inner.len() == 3 && inner.contains(CODE_MEANING) => {
            ParameterValue::Text(required_text(inner, &name)?.to_string())
        }
        ElementValue::Item(inner) if inner.len() == 2 || inner.len() == 3 => {
            ParameterValue::Number(inner.number(NUMERIC_VALUE).ok_or_else(|| {
                NcirfError::MalformedReport(format!("measurement '{}' has no numeric value", name))
            })?)
        }
        ElementValue::Item(inner) => {
            return Err(NcirfError::MalformedReport(format!(
                "value of '{}' is an item with {} elements",
                name,
                inner.len()
            )));
        }
        ElementValue::Null => ParameterValue::Text(container.vr.clone()),
        ElementValue::Text(s) => ParameterValue::Text(s.clone()),
        ElementValue::Number(n) => ParameterValue::Number(*n),
        ElementValue::Person(person) => {
            ParameterValue::Text(person.alphabetic.clone().unwrap_or_default())
        }
    };

    Ok((name, value))
}

/// Code Meaning of an item's Concept Name Code Sequence
pub fn concept_name(item: &Dataset) -> Result<&str> {
    item.first_item(CONCEPT_NAME_CODE_SEQUENCE)
        .and_then(|code| code.text(CODE_MEANING))
        .ok_or_else(|| NcirfError::MalformedReport("content item has no concept name".to_string()))
}

fn required_text<'a>(code: &'a Dataset, name: &str) -> Result<&'a str> {
    code.text(CODE_MEANING).ok_or_else(|| {
        NcirfError::MalformedReport(format!("coded value of '{}' has no meaning", name))
    })
}

fn value_items(item: &Dataset) -> Result<Vec<&Dataset>> {
    item.last()
        .map(|(_, container)| container.items().collect())
        .ok_or_else(|| NcirfError::MalformedReport("empty content item".to_string()))
}
