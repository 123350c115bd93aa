// Wire-level filter records, the shapes the backend query parser reads
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::types::{FilterType, LineageFilter};

/// Value of a compiled property record. Always a string except for
/// synthetic `in` filters, which carry a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Text(String),
    List(Vec<String>),
}

impl RecordValue {
    pub fn is_empty_text(&self) -> bool {
        matches!(self, RecordValue::Text(s) if s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub label: String,
    pub property_name: String,
    pub filter_type: FilterType,
    pub value: RecordValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepliconRecord {
    pub label: String,
    pub accession: String,
    pub exclude: bool,
}

/// Profile record with backend (snake_case) keys, in display order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(pub Map<String, Value>);

impl ProfileRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// One entry of an `andFilter` list.
///
/// Deserialization picks the variant by key: `property_name`, then
/// `lineageList`, then `accession`. A profile record is whatever carries
/// none of them. A record with a discriminating key but a bad shape is an
/// error, never a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterRecord {
    Property(PropertyRecord),
    Lineage(LineageFilter),
    Replicon(RepliconRecord),
    Profile(ProfileRecord),
}

impl<'de> Deserialize<'de> for FilterRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let record = if fields.contains_key("property_name") {
            serde_json::from_value(Value::Object(fields)).map(FilterRecord::Property)
        } else if fields.contains_key("lineageList") {
            serde_json::from_value(Value::Object(fields)).map(FilterRecord::Lineage)
        } else if fields.contains_key("accession") {
            serde_json::from_value(Value::Object(fields)).map(FilterRecord::Replicon)
        } else {
            return Ok(FilterRecord::Profile(ProfileRecord(fields)));
        };
        record.map_err(D::Error::custom)
    }
}

impl FilterRecord {
    pub fn label(&self) -> Option<&str> {
        match self {
            FilterRecord::Property(r) => Some(&r.label),
            FilterRecord::Lineage(r) => Some(&r.label),
            FilterRecord::Replicon(r) => Some(&r.label),
            FilterRecord::Profile(r) => r.get("label").and_then(Value::as_str),
        }
    }

    pub fn property_name(&self) -> Option<&str> {
        match self {
            FilterRecord::Property(r) => Some(&r.property_name),
            _ => None,
        }
    }

    /// Record whose `value` is exactly the empty string
    pub fn has_empty_value(&self) -> bool {
        match self {
            FilterRecord::Property(r) => r.value.is_empty_text(),
            FilterRecord::Profile(r) => r.get("value").and_then(Value::as_str) == Some(""),
            _ => false,
        }
    }
}

/// Compiled form of a filter group: AND-ed records plus OR-ed subgroups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroupFilters {
    #[serde(default)]
    pub and_filter: Vec<FilterRecord>,
    #[serde(default)]
    pub or_filter: Vec<FilterGroupFilters>,
}

impl FilterGroupFilters {
    pub fn is_empty(&self) -> bool {
        self.and_filter.is_empty() && self.or_filter.is_empty()
    }
}
