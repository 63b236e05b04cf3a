use dicom_core::Tag;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One level of a decoded report tree
///
/// Mirrors the DICOM JSON model: an ordered map from tag to element.
/// Elements are kept in tag order, the same order `InMemDicomObject`
/// iterates in, so "first" and "last" element are well defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    elements: BTreeMap<Tag, Element>,
}

impl Dataset {
    /// Creates an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from (tag, element) pairs
    pub fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = (Tag, Element)>,
    {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    /// Inserts an element, replacing any element with the same tag
    pub fn insert(&mut self, tag: Tag, element: Element) -> Option<Element> {
        self.elements.insert(tag, element)
    }

    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Number of elements at this level (not counting nested items)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element with the highest tag
    pub fn last(&self) -> Option<(Tag, &Element)> {
        self.elements.last_key_value().map(|(tag, elem)| (*tag, elem))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Element)> {
        self.elements.iter().map(|(tag, elem)| (*tag, elem))
    }

    /// Sequence items of the element at `tag`
    ///
    /// Returns `None` if the element is absent; an element without
    /// values yields an empty list.
    pub fn items(&self, tag: Tag) -> Option<Vec<&Dataset>> {
        self.get(tag).map(|elem| elem.items().collect())
    }

    /// First item of the sequence at `tag`
    pub fn first_item(&self, tag: Tag) -> Option<&Dataset> {
        self.get(tag).and_then(|elem| elem.items().next())
    }

    /// First textual value of the element at `tag`, trimmed
    pub fn text(&self, tag: Tag) -> Option<&str> {
        match self.get(tag)?.first_value()? {
            ElementValue::Text(s) => Some(s.trim()),
            ElementValue::Person(name) => name.alphabetic.as_deref(),
            _ => None,
        }
    }

    /// First numeric value of the element at `tag`
    pub fn number(&self, tag: Tag) -> Option<f64> {
        match self.get(tag)?.first_value()? {
            ElementValue::Number(n) => Some(*n),
            ElementValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Parses a DICOM JSON document
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A single element: value representation plus zero or more values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub vr: String,

    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<ElementValue>>,
}

impl Element {
    pub fn new(vr: impl Into<String>, values: Vec<ElementValue>) -> Self {
        Self {
            vr: vr.into(),
            value: Some(values),
        }
    }

    /// Element that carries no value at all
    pub fn empty(vr: impl Into<String>) -> Self {
        Self {
            vr: vr.into(),
            value: None,
        }
    }

    /// Sequence (SQ) element holding the given items
    pub fn sequence(items: Vec<Dataset>) -> Self {
        Self::new("SQ", items.into_iter().map(ElementValue::Item).collect())
    }

    /// Values of the element, or `None` when it carries none
    pub fn values(&self) -> Option<&[ElementValue]> {
        self.value.as_deref().filter(|values| !values.is_empty())
    }

    /// First value that is not an empty (`null`) entry
    pub fn first_value(&self) -> Option<&ElementValue> {
        self.values()?
            .iter()
            .find(|value| !matches!(value, ElementValue::Null))
    }

    /// Nested sequence items, skipping non-item values
    pub fn items(&self) -> impl Iterator<Item = &Dataset> {
        self.value
            .iter()
            .flatten()
            .filter_map(|value| match value {
                ElementValue::Item(item) => Some(item),
                _ => None,
            })
    }
}

/// A single value inside an element's value list
///
/// `Null` stands for an empty entry of a multi-valued element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementValue {
    Null,
    Number(f64),
    Text(String),
    Item(Dataset),
    Person(PersonName),
}

/// Person name in DICOM JSON form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonName {
    #[serde(rename = "Alphabetic", default, skip_serializing_if = "Option::is_none")]
    pub alphabetic: Option<String>,

    #[serde(rename = "Ideographic", default, skip_serializing_if = "Option::is_none")]
    pub ideographic: Option<String>,

    #[serde(rename = "Phonetic", default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

impl PersonName {
    pub fn alphabetic(name: impl Into<String>) -> Self {
        Self {
            alphabetic: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Parses an 8-digit hexadecimal tag key such as `0040A730`
pub fn parse_tag_key(key: &str) -> Option<Tag> {
    if key.len() != 8 || !key.is_ascii() {
        return None;
    }
    let group = u16::from_str_radix(&key[..4], 16).ok()?;
    let element = u16::from_str_radix(&key[4..], 16).ok()?;
    Some(Tag(group, element))
}

/// Formats a tag as an 8-digit upper-case hexadecimal key
pub fn tag_key(tag: Tag) -> String {
    format!("{:04X}{:04X}", tag.0, tag.1)
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.elements.len()))?;
        for (tag, element) in &self.elements {
            map.serialize_entry(&tag_key(*tag), element)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Element>::deserialize(deserializer)?;
        let mut elements = BTreeMap::new();
        for (key, element) in raw {
            let tag = parse_tag_key(&key)
                .ok_or_else(|| D::Error::custom(format!("invalid tag key '{}'", key)))?;
            elements.insert(tag, element);
        }
        Ok(Self { elements })
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Null => Ok(()),
            ElementValue::Number(n) => write!(f, "{}", n),
            ElementValue::Text(s) => write!(f, "{}", s),
            ElementValue::Item(item) => write!(f, "<item with {} elements>", item.len()),
            ElementValue::Person(name) => {
                write!(f, "{}", name.alphabetic.as_deref().unwrap_or(""))
            }
        }
    }
}
