//! Decoded report tree
//!
//! The converter works on a tag-addressed tree in the shape of the DICOM
//! JSON model. Trees come either from a DICOM JSON file or from a binary
//! DICOM file read with `dicom-object` and converted by [`dataset_from_dicom`].

mod date;
mod dicom;
mod node;

pub use date::parse_dicom_date;
pub use dicom::{dataset_from_dicom, read_report_file};
pub use node::{parse_tag_key, tag_key, Dataset, Element, ElementValue, PersonName};
