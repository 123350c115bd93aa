// Request payload: compiled filters plus pagination and scoping
use serde::{Deserialize, Serialize};

use super::params::Pagination;
use crate::filters::{
    compile, FilterGroup, FilterGroupFilters, FilterRecord, FilterType, PropertyRecord,
    RecordValue, RepliconRecord,
};

/// Data set marker meaning "samples without a data set"; sent as `""`
pub const EMPTY_DATASET: &str = "__empty__";

/// How a reference scope is attached to the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceScope {
    /// Prepend a `Reference` filter record
    #[default]
    Filter,
    /// Set the top-level `reference_accession` parameter
    RootParameter,
}

/// Top-level payload handed to the query serializer.
///
/// Field order is the order of the emitted query parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroupRoot {
    #[serde(default)]
    pub filters: FilterGroupFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_accession: Option<String>,
}

impl FilterGroupRoot {
    pub fn new(filters: FilterGroupFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Compile `group` into a fresh payload
    pub fn from_group(group: &FilterGroup) -> Self {
        Self::new(compile(group))
    }

    /// Restrict to the given data sets by prepending an `in` filter
    pub fn with_dataset_scope(mut self, data_sets: &[String]) -> Self {
        if data_sets.is_empty() {
            return self;
        }
        let values = data_sets
            .iter()
            .map(|d| {
                if d == EMPTY_DATASET {
                    String::new()
                } else {
                    d.clone()
                }
            })
            .collect();
        self.unshift(FilterRecord::Property(PropertyRecord {
            label: "Property".to_string(),
            property_name: "data_set".to_string(),
            filter_type: FilterType::In,
            value: RecordValue::List(values),
        }));
        self
    }

    /// Restrict to one reference genome
    pub fn with_reference_scope(mut self, accession: &str, mode: ReferenceScope) -> Self {
        if accession.is_empty() {
            return self;
        }
        match mode {
            ReferenceScope::Filter => self.unshift(FilterRecord::Replicon(RepliconRecord {
                label: "Reference".to_string(),
                accession: accession.to_string(),
                exclude: false,
            })),
            ReferenceScope::RootParameter => {
                self.reference_accession = Some(accession.to_string());
            }
        }
        self
    }

    pub fn with_page(mut self, page: Pagination) -> Self {
        self.limit = Some(page.limit);
        self.offset = Some(page.offset);
        self
    }

    /// Insert before all existing AND records; the last scope applied ends up first
    fn unshift(&mut self, record: FilterRecord) {
        self.filters.and_filter.insert(0, record);
    }

    /// Encode as a `?key=value&...` query string
    pub fn to_query_string(&self) -> String {
        super::serializer::to_query_string(self)
    }
}
