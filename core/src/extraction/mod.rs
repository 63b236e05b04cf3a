pub mod event;
pub mod navigator;
pub mod parameter;
pub mod tags;

pub use event::{IrradiationEvent, ParameterValue};
pub use navigator::{isolate_events, MIN_EVENT_PARAMETERS, MIN_SECTION_ELEMENTS};
pub use parameter::{concept_name, extract_event, extract_parameter, ItemShape, COMPOSITE_CONCEPTS};
pub use tags::*;
