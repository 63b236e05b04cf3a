use super::node::{Dataset, Element, ElementValue, PersonName};
use crate::error::Result;
use dicom_core::value::{PrimitiveValue, Value};
use dicom_core::VR;
use dicom_object::mem::InMemElement;
use dicom_object::{open_file, InMemDicomObject};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads a report from disk
///
/// Files with a `.json` extension are parsed as DICOM JSON; anything
/// else is opened as a binary DICOM file and converted.
pub fn read_report_file(path: &Path) -> Result<Dataset> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        debug!("Reading DICOM JSON report: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    } else {
        debug!("Reading DICOM report: {}", path.display());
        let dcm = open_file(path)?;
        Ok(dataset_from_dicom(&dcm))
    }
}

/// Converts an in-memory DICOM object into a report tree
///
/// Value mapping follows the DICOM JSON model: numeric VRs become
/// numbers, PN becomes a person name, SQ items are converted
/// recursively, and bulk binary data is dropped.
pub fn dataset_from_dicom(dcm: &InMemDicomObject) -> Dataset {
    Dataset::from_elements(
        dcm.into_iter()
            .map(|elem| (elem.header().tag, convert_element(elem))),
    )
}

fn convert_element(elem: &InMemElement) -> Element {
    let vr = elem.vr();
    let values = match elem.value() {
        Value::Sequence(seq) => Some(
            seq.items()
                .iter()
                .map(|item| ElementValue::Item(dataset_from_dicom(item)))
                .collect::<Vec<_>>(),
        ),
        Value::Primitive(primitive) => convert_primitive(vr, primitive),
        _ => None,
    };

    Element {
        vr: vr.to_string().to_owned(),
        value: values.filter(|v| !v.is_empty()),
    }
}

fn convert_primitive(vr: VR, value: &PrimitiveValue) -> Option<Vec<ElementValue>> {
    if matches!(value, PrimitiveValue::Empty) {
        return None;
    }

    match vr {
        VR::DS | VR::IS | VR::FL | VR::FD | VR::SL | VR::SS | VR::UL | VR::US => value
            .to_multi_float64()
            .ok()
            .map(|numbers| numbers.into_iter().map(ElementValue::Number).collect()),
        VR::PN => Some(
            value
                .to_multi_str()
                .iter()
                .map(|s| ElementValue::Person(PersonName::alphabetic(trim_padding(s))))
                .collect(),
        ),
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OW | VR::UN => None,
        _ => Some(
            value
                .to_multi_str()
                .iter()
                .map(|s| ElementValue::Text(trim_padding(s).to_string()))
                .collect(),
        ),
    }
}

fn trim_padding(s: &str) -> &str {
    s.trim_end_matches(|c: char| c == '\0' || c == ' ')
}
