//! Builders for structured-report trees used in unit tests

use crate::extraction::tags::{
    CODE_MEANING, CODE_VALUE, CODING_SCHEME_DESIGNATOR, CONCEPT_CODE_SEQUENCE,
    CONCEPT_NAME_CODE_SEQUENCE, CONTENT_SEQUENCE, CONTINUITY_OF_CONTENT, DATE_TIME,
    MEASUREMENT_UNITS_CODE_SEQUENCE, MEASURED_VALUE_SEQUENCE, NUMERIC_VALUE, PATIENT_BIRTH_DATE,
    PATIENT_SEX, RELATIONSHIP_TYPE, STUDY_DATE, TEXT_VALUE, VALUE_TYPE,
};
use crate::report::{tag_key, Dataset};
use dicom_core::Tag;
use serde_json::{json, Map, Value};

fn element(tag: Tag, vr: &str, values: Value) -> (String, Value) {
    (tag_key(tag), json!({"vr": vr, "Value": values}))
}

fn object(entries: Vec<(String, Value)>) -> Value {
    Value::Object(entries.into_iter().collect::<Map<_, _>>())
}

fn code(meaning: &str) -> Value {
    object(vec![
        element(CODE_VALUE, "SH", json!(["0000"])),
        element(CODING_SCHEME_DESIGNATOR, "SH", json!(["DCM"])),
        element(CODE_MEANING, "LO", json!([meaning])),
    ])
}

fn header(value_type: &str, name: &str) -> Vec<(String, Value)> {
    vec![
        element(RELATIONSHIP_TYPE, "CS", json!(["CONTAINS"])),
        element(VALUE_TYPE, "CS", json!([value_type])),
        element(CONCEPT_NAME_CODE_SEQUENCE, "SQ", json!([code(name)])),
    ]
}

/// NUM content item (4 elements)
pub fn num_item(name: &str, value: f64) -> Value {
    let measured = object(vec![
        element(MEASUREMENT_UNITS_CODE_SEQUENCE, "SQ", json!([code("unit")])),
        element(NUMERIC_VALUE, "DS", json!([value])),
    ]);
    let mut entries = header("NUM", name);
    entries.push(element(MEASURED_VALUE_SEQUENCE, "SQ", json!([measured])));
    object(entries)
}

/// CODE content item (4 elements)
pub fn code_item(name: &str, meaning: &str) -> Value {
    let mut entries = header("CODE", name);
    entries.push(element(CONCEPT_CODE_SEQUENCE, "SQ", json!([code(meaning)])));
    object(entries)
}

/// TEXT content item (4 elements)
pub fn text_item(name: &str, text: &str) -> Value {
    let mut entries = header("TEXT", name);
    entries.push(element(TEXT_VALUE, "UT", json!([text])));
    object(entries)
}

/// DATETIME content item (4 elements)
pub fn datetime_item(name: &str, dt: &str) -> Value {
    let mut entries = header("DATETIME", name);
    entries.push(element(DATE_TIME, "DT", json!([dt])));
    object(entries)
}

/// CONTAINER content item with children (5 elements)
pub fn container_item(name: &str, children: Vec<Value>) -> Value {
    let mut entries = header("CONTAINER", name);
    entries.push(element(CONTINUITY_OF_CONTENT, "CS", json!(["SEPARATE"])));
    entries.push(element(CONTENT_SEQUENCE, "SQ", Value::Array(children)));
    object(entries)
}

/// CODE content item qualified by one child item (5 elements)
pub fn nested_item(name: &str, child: Value) -> Value {
    let mut entries = header("CODE", name);
    entries.push(element(CONCEPT_CODE_SEQUENCE, "SQ", json!([code(name)])));
    entries.push(element(CONTENT_SEQUENCE, "SQ", json!([child])));
    object(entries)
}

/// CODE content item with several child items (6 elements)
pub fn composite_item(name: &str, children: Vec<Value>) -> Value {
    let mut entries = header("CODE", name);
    entries.push(element(CONTINUITY_OF_CONTENT, "CS", json!(["SEPARATE"])));
    entries.push(element(CONCEPT_CODE_SEQUENCE, "SQ", json!([code(name)])));
    entries.push(element(CONTENT_SEQUENCE, "SQ", Value::Array(children)));
    object(entries)
}

/// Corrected-profile filter description
pub fn filter_items(material: &str, min: f64, max: f64) -> Value {
    container_item(
        "X-Ray Filters",
        vec![
            code_item("X-Ray Filter Type", "Flat filter"),
            code_item("X-Ray Filter Material", material),
            num_item("X-Ray Filter Thickness Minimum", min),
            num_item("X-Ray Filter Thickness Maximum", max),
        ],
    )
}

/// Parameters of the reference fluoroscopy event, keyed for overriding
pub fn reference_event() -> Vec<(&'static str, Value)> {
    vec![
        ("DateTime Started", datetime_item("DateTime Started", "20191115101520.123")),
        ("Irradiation Event Type", code_item("Irradiation Event Type", "Fluoroscopy")),
        ("Target Region", code_item("Target Region", "Abdomen")),
        ("Dose Area Product", num_item("Dose Area Product", 2e-6)),
        ("Dose (RP)", num_item("Dose (RP)", 0.01)),
        ("Positioner Primary Angle", num_item("Positioner Primary Angle", -8.9)),
        ("Positioner Secondary Angle", num_item("Positioner Secondary Angle", 11.5)),
        ("Collimated Field Area", num_item("Collimated Field Area", 0.0)),
        ("Collimated Field Height", num_item("Collimated Field Height", 0.0)),
        ("Collimated Field Width", num_item("Collimated Field Width", 0.0)),
        ("X-Ray Filters", filter_items("Copper or Copper compound", 0.2, 0.2)),
        ("KVP", num_item("KVP", 81.0)),
        ("X-Ray Tube Current", num_item("X-Ray Tube Current", 12.0)),
        ("Pulse Rate", num_item("Pulse Rate", 15.0)),
        ("Distance Source to Isocenter", num_item("Distance Source to Isocenter", 750.0)),
        ("Distance Source to Detector", num_item("Distance Source to Detector", 1000.0)),
        ("Table Longitudinal Position", num_item("Table Longitudinal Position", 25.1)),
        ("Table Lateral Position", num_item("Table Lateral Position", 604.2)),
        ("Table Height Position", num_item("Table Height Position", 171.6)),
        ("Acquisition Plane", code_item("Acquisition Plane", "Single Plane")),
    ]
}

/// Replaces or appends parameters of an event
pub fn with_params(
    mut params: Vec<(&'static str, Value)>,
    overrides: Vec<(&'static str, Value)>,
) -> Vec<(&'static str, Value)> {
    for (name, item) in overrides {
        match params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = item,
            None => params.push((name, item)),
        }
    }
    params
}

/// Removes parameters from an event
pub fn without_params(
    params: Vec<(&'static str, Value)>,
    names: &[&str],
) -> Vec<(&'static str, Value)> {
    params
        .into_iter()
        .filter(|(n, _)| !names.contains(n))
        .collect()
}

/// Wraps event parameters into an irradiation event container
///
/// Pads with comment items so that trimmed events still look like dense
/// event groups to the navigator.
pub fn event_container(params: Vec<(&'static str, Value)>) -> Value {
    let mut children: Vec<Value> = params.into_iter().map(|(_, item)| item).collect();
    let mut filler = 0;
    while children.len() < 20 {
        filler += 1;
        children.push(text_item(&format!("Comment {}", filler), "padding"));
    }
    container_item("Irradiation Event X-Ray Data", children)
}

/// Complete report: demographics, administrative items, then events
pub fn report(birth_date: Option<&str>, sex: Option<&str>, events: Vec<Value>) -> Dataset {
    let mut root = vec![element(STUDY_DATE, "DA", json!(["20191115"]))];
    root.push(match birth_date {
        Some(date) => element(PATIENT_BIRTH_DATE, "DA", json!([date])),
        None => (tag_key(PATIENT_BIRTH_DATE), json!({"vr": "DA"})),
    });
    root.push(match sex {
        Some(s) => element(PATIENT_SEX, "CS", json!([s])),
        None => (tag_key(PATIENT_SEX), json!({"vr": "CS"})),
    });

    let mut content = vec![
        code_item("Procedure reported", "Projection X-Ray"),
        text_item("Comment", "administrative"),
        container_item(
            "Accumulated X-Ray Dose Data",
            vec![
                num_item("Dose Area Product Total", 4e-6),
                num_item("Fluoro Dose Area Product Total", 4e-6),
            ],
        ),
    ];
    content.extend(events);
    root.push(element(CONTENT_SEQUENCE, "SQ", Value::Array(content)));

    serde_json::from_value(object(root)).expect("test report must deserialize")
}

/// Event parameter items as a dataset list, for extractor tests
pub fn items(values: Vec<Value>) -> Vec<Dataset> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).expect("test item must deserialize"))
        .collect()
}
