// Request assembly: payload root, scoping, and query-string encoding
//
// FilterGroupFilters -> FilterGroupRoot (+ scopes, paging) -> "?filters=..."

mod params;
mod root;
pub mod serializer;

pub use params::{encode_params, Ordering, Pagination, ParamValue};
pub use root::{FilterGroupRoot, ReferenceScope, EMPTY_DATASET};
pub use serializer::{encode_json_params, parse_query_string, to_query_string};
