// Filter model, filter group tree and the compiler that flattens it
//
// UI edits FilterGroup -> compile() -> FilterGroupFilters (wire form)

pub mod compiler;
pub mod dates;
mod group;
mod record;
mod types;

pub use compiler::{backend_key, compile, has_property_filter};
pub use dates::{normalize_date_range, parse_date};
pub use group::{AndFilters, FilterGroup};
pub use record::{
    FilterGroupFilters, FilterRecord, ProfileRecord, PropertyRecord, RecordValue, RepliconRecord,
};
pub use types::{
    ColumnKind, FilterType, GenomeFilter, LineageFilter, ProfileCriterion, ProfileField,
    ProfileFilter, PropertyFilter, PropertyValue, RepliconFilter,
};
