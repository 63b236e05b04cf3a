use crate::error::{NcirfError, Result};
use crate::report::Dataset;
use log::debug;

use super::tags::CONTENT_SEQUENCE;

/// Fewest elements a top-level content item needs to be considered a
/// section rather than an administrative entry (patient, equipment,
/// person participant)
///
/// This is a shape heuristic, not a semantic check: administrative
/// entries are plain CODE/TEXT/UIDREF items with four elements, while
/// sections are containers carrying a content sequence.
pub const MIN_SECTION_ELEMENTS: usize = 5;

/// Fewest content items a section needs to be treated as one irradiation
/// event
///
/// Also a shape heuristic: irradiation event containers list dozens of
/// acquisition parameters, while accumulated-dose and other structural
/// containers hold only a handful.
pub const MIN_EVENT_PARAMETERS: usize = 20;

/// Isolates the parameter groups of all irradiation events in a report
///
/// Returns one list of content items per event, in document order.
///
/// # Errors
///
/// Returns `MalformedReport` if the root has no content sequence.
pub fn isolate_events(root: &Dataset) -> Result<Vec<Vec<&Dataset>>> {
    let sections = root.items(CONTENT_SEQUENCE).ok_or_else(|| {
        NcirfError::MalformedReport("report has no top-level Content Sequence".to_string())
    })?;

    let events: Vec<Vec<&Dataset>> = sections
        .into_iter()
        .filter(|section| section.len() >= MIN_SECTION_ELEMENTS)
        .map(|section| section.items(CONTENT_SEQUENCE).unwrap_or_default())
        .filter(|params| {
            let dense = params.len() >= MIN_EVENT_PARAMETERS;
            if !dense {
                debug!("Ignoring section with {} content items", params.len());
            }
            dense
        })
        .collect();

    debug!("Isolated {} irradiation events", events.len());
    Ok(events)
}
