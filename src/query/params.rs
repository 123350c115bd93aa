// Plain request parameters (pagination, ordering, export columns).
// Encoded key=value with lists repeated per item, unlike the JSON-per-key
// filter payload.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single plain query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Bool(bool),
    /// Repeated as `key=a&key=b`
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Encode parameters without a leading `?`; empty input gives `""`
pub fn encode_params(params: &[(&str, ParamValue)]) -> String {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let key = urlencoding::encode(key.trim());
        match value {
            ParamValue::Text(s) => pairs.push(format!("{}={}", key, urlencoding::encode(s))),
            ParamValue::Int(n) => pairs.push(format!("{}={}", key, n)),
            ParamValue::Bool(b) => pairs.push(format!("{}={}", key, b)),
            ParamValue::List(items) => {
                pairs.extend(
                    items
                        .iter()
                        .map(|item| format!("{}={}", key, urlencoding::encode(item))),
                );
            }
        }
    }
    pairs.join("&")
}

/// Page window of a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Window of the zero-based `page`, clamped at the end of the offset range
    pub fn at_page(limit: u64, page: u64) -> Self {
        Self::new(limit, page.saturating_mul(limit))
    }

    /// Zero-based page index
    pub fn page(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            ..*self
        }
    }
}

/// Sort field; a leading `-` means descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            descending: !self.descending,
        }
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Self::descending("collection_date")
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl FromStr for Ordering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, descending) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if field.is_empty() {
            return Err(format!("invalid ordering '{}'", s));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

impl TryFrom<String> for Ordering {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ordering> for String {
    fn from(ordering: Ordering) -> Self {
        ordering.to_string()
    }
}
