//! Filter compiler
//!
//! Flattens a [`FilterGroup`] tree into the wire form read by the backend:
//! each node becomes an `andFilter` list followed by its children compiled
//! into `orFilter`. Incomplete filters are dropped, never rejected, so a
//! filter that is still being edited does not break the query.
//!
//! Record order inside `andFilter` is fixed: property, profile, replicon,
//! lineage. The backend resolves duplicate keys in that order.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::dates::normalize_date_range;
use super::group::FilterGroup;
use super::record::{
    FilterGroupFilters, FilterRecord, ProfileRecord, PropertyRecord, RecordValue, RepliconRecord,
};
use super::types::{
    LineageFilter, ProfileField, ProfileFilter, PropertyFilter, PropertyValue, RepliconFilter,
};

/// Compile a group and all its descendants
pub fn compile(group: &FilterGroup) -> FilterGroupFilters {
    let filters = &group.filters;
    let mut and_filter = Vec::with_capacity(filters.len());

    and_filter.extend(filters.property_filters.iter().filter_map(compile_property));
    and_filter.extend(filters.profile_filters.iter().filter_map(compile_profile));
    and_filter.extend(filters.replicon_filters.iter().filter_map(compile_replicon));
    and_filter.extend(compile_lineage(&filters.lineage_filter));

    let or_filter: Vec<FilterGroupFilters> = group.filter_groups.iter().map(compile).collect();

    tracing::trace!(
        and_records = and_filter.len(),
        or_groups = or_filter.len(),
        "compiled filter group"
    );

    FilterGroupFilters {
        and_filter,
        or_filter,
    }
}

/// Property filter to record; `None` unless name, operator and value are set.
///
/// Two or more dates become a `range` over local calendar days. A single
/// date compiles to an empty value (the stringified empty list), which the
/// query serializer then strips.
pub(crate) fn compile_property(filter: &PropertyFilter) -> Option<FilterRecord> {
    if !filter.is_complete() {
        tracing::debug!(
            property = %filter.property_name,
            "dropping incomplete property filter"
        );
        return None;
    }
    let filter_type = filter.effective_filter_type()?;

    let value = match &filter.value {
        PropertyValue::Dates { dates } if dates.len() >= 2 => normalize_date_range(dates)
            .map(|range| range.join(","))
            .unwrap_or_default(),
        // TODO: build the one-day range once the UI decides single picks mean "that day"
        PropertyValue::Dates { .. } => String::new(),
        other => other.to_wire_string(),
    };

    Some(FilterRecord::Property(PropertyRecord {
        label: filter.label.clone(),
        property_name: filter.property_name.clone(),
        filter_type,
        value: RecordValue::Text(value),
    }))
}

fn uppercase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([A-Z])").expect("static uppercase pattern"))
}

/// Display key to backend key: the first `AA` marker becomes `_aa`, then
/// every remaining uppercase letter gets a leading underscore and the whole
/// key is lowercased (`refAA` -> `ref_aa`, `geneSymbol` -> `gene_symbol`).
pub fn backend_key(display_key: &str) -> String {
    let marked = display_key.replacen("AA", "_aa", 1);
    uppercase_pattern()
        .replace_all(&marked, "_$1")
        .to_lowercase()
}

/// Profile filter to record with translated keys; `None` if any field other
/// than `exclude` is empty
pub(crate) fn compile_profile(filter: &ProfileFilter) -> Option<FilterRecord> {
    let mut record = Map::new();
    for (key, field) in filter.fields() {
        if key != "exclude" && !field.is_truthy() {
            tracing::debug!(field = key, label = %filter.label, "dropping incomplete profile filter");
            return None;
        }
        let value = match field {
            ProfileField::Text(s) => Value::String(s.to_string()),
            ProfileField::Flag(b) => Value::Bool(b),
        };
        record.insert(backend_key(key), value);
    }
    Some(FilterRecord::Profile(ProfileRecord(record)))
}

pub(crate) fn compile_replicon(filter: &RepliconFilter) -> Option<FilterRecord> {
    if filter.accession.is_empty() {
        return None;
    }
    Some(FilterRecord::Replicon(RepliconRecord {
        label: filter.label.clone(),
        accession: filter.accession.clone(),
        exclude: filter.exclude,
    }))
}

pub(crate) fn compile_lineage(filter: &LineageFilter) -> Option<FilterRecord> {
    filter
        .is_active()
        .then(|| FilterRecord::Lineage(filter.clone()))
}

/// Whether a property filter on `property_name` is set at the top level or
/// in one of the direct OR-groups
pub fn has_property_filter(filters: &FilterGroupFilters, property_name: &str) -> bool {
    let in_and_set = |group: &FilterGroupFilters| {
        group
            .and_filter
            .iter()
            .any(|record| record.property_name() == Some(property_name))
    };
    in_and_set(filters) || filters.or_filter.iter().any(in_and_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::types::{FilterType, ProfileCriterion};
    use chrono::{DateTime, FixedOffset, TimeZone};
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_backend_key_translation() {
        assert_eq!(backend_key("label"), "label");
        assert_eq!(backend_key("geneSymbol"), "gene_symbol");
        assert_eq!(backend_key("refAA"), "ref_aa");
        assert_eq!(backend_key("altAA"), "alt_aa");
        assert_eq!(backend_key("proteinSymbol"), "protein_symbol");
        assert_eq!(backend_key("firstDeleted"), "first_deleted");
    }

    #[test]
    fn test_empty_tree_compiles_to_empty_filters() {
        let compiled = compile(&FilterGroup::default());
        assert!(compiled.is_empty());
    }

    #[test]
    fn test_initial_tree_compiles_to_empty_filters() {
        let compiled = compile(&FilterGroup::initial("collection_date"));
        assert!(compiled.and_filter.is_empty());
        assert!(compiled.or_filter.is_empty());
    }

    #[test]
    fn test_date_range_scenario() {
        let group = FilterGroup::default().with_filter(PropertyFilter::new(
            "collection_date",
            FilterType::Range,
            vec![day(2024, 1, 1), day(2024, 1, 5)],
        ));
        let compiled = compile(&group);
        assert_eq!(
            serde_json::to_value(&compiled.and_filter).unwrap(),
            json!([{
                "label": "Property",
                "property_name": "collection_date",
                "filter_type": "range",
                "value": "2024-01-01,2024-01-05"
            }])
        );
    }

    #[test]
    fn test_two_dates_force_range_without_mutating() {
        let group = FilterGroup::default().with_filter(PropertyFilter::new(
            "collection_date",
            FilterType::Exact,
            vec![day(2024, 1, 5), day(2024, 1, 1)],
        ));
        let compiled = compile(&group);
        match &compiled.and_filter[0] {
            FilterRecord::Property(r) => {
                assert_eq!(r.filter_type, FilterType::Range);
                assert_eq!(r.value, RecordValue::Text("2024-01-05,2024-01-01".into()));
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(
            group.filters.property_filters[0].filter_type,
            Some(FilterType::Exact)
        );
    }

    #[test]
    fn test_single_date_compiles_to_empty_value() {
        let group = FilterGroup::default().with_filter(PropertyFilter::new(
            "collection_date",
            FilterType::Range,
            vec![day(2024, 1, 1)],
        ));
        let compiled = compile(&group);
        assert_eq!(compiled.and_filter.len(), 1);
        assert!(compiled.and_filter[0].has_empty_value());
    }

    #[test]
    fn test_incomplete_property_filters_are_dropped() {
        let mut no_type = PropertyFilter::new("lab", FilterType::Exact, "RKI");
        no_type.filter_type = None;
        let group = FilterGroup::default()
            .with_filter(PropertyFilter::new("", FilterType::Exact, "RKI"))
            .with_filter(no_type)
            .with_filter(PropertyFilter::new("lab", FilterType::Exact, ""))
            .with_filter(PropertyFilter::new("age", FilterType::Gt, 0.0))
            .with_filter(PropertyFilter::new("age", FilterType::Gt, 30.0));

        let compiled = compile(&group);
        assert_eq!(compiled.and_filter.len(), 1);
        match &compiled.and_filter[0] {
            FilterRecord::Property(r) => assert_eq!(r.value, RecordValue::Text("30".into())),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_list_value_is_comma_joined() {
        let group = FilterGroup::default().with_filter(PropertyFilter::new(
            "zip_code",
            FilterType::In,
            PropertyValue::List(vec!["10115".into(), "10117".into()]),
        ));
        let compiled = compile(&group);
        assert_eq!(
            serde_json::to_value(&compiled.and_filter[0]).unwrap()["value"],
            "10115,10117"
        );
    }

    #[test]
    fn test_profile_record_keys_are_translated() {
        let group = FilterGroup::default().with_filter(
            ProfileFilter::new(ProfileCriterion::SnpAa {
                protein_symbol: "S".into(),
                ref_aa: "N".into(),
                ref_pos: "501".into(),
                alt_aa: "Y".into(),
            })
            .excluded(),
        );
        let compiled = compile(&group);
        assert_eq!(
            serde_json::to_value(&compiled.and_filter[0]).unwrap(),
            json!({
                "label": "SNP AA",
                "protein_symbol": "S",
                "ref_aa": "N",
                "ref_pos": "501",
                "alt_aa": "Y",
                "exclude": true
            })
        );
    }

    #[test]
    fn test_profile_with_empty_field_is_dropped() {
        let group = FilterGroup::default()
            .with_filter(ProfileFilter::new(ProfileCriterion::DelNt {
                gene_symbol: "ORF1ab".into(),
                first_deleted: "11288".into(),
                last_deleted: String::new(),
            }))
            .with_filter(ProfileFilter::notation(""));
        assert!(compile(&group).and_filter.is_empty());
    }

    #[test]
    fn test_exclude_false_does_not_disqualify_profile() {
        let group = FilterGroup::default().with_filter(ProfileFilter::notation("S:N501Y"));
        let compiled = compile(&group);
        assert_eq!(
            serde_json::to_value(&compiled.and_filter[0]).unwrap(),
            json!({"label": "DNA/AA Profile", "value": "S:N501Y", "exclude": false})
        );
    }

    #[test]
    fn test_replicon_and_lineage_records() {
        let group = FilterGroup::default()
            .with_filter(RepliconFilter::new(""))
            .with_filter(RepliconFilter::new("NC_045512.2"))
            .with_filter(LineageFilter::new(["BA.2"]));
        let compiled = compile(&group);
        assert_eq!(
            serde_json::to_value(&compiled.and_filter).unwrap(),
            json!([
                {"label": "Replicon", "accession": "NC_045512.2", "exclude": false},
                {"label": "Lineages", "lineageList": ["BA.2"], "exclude": false,
                 "includeSublineages": true, "isVisible": true}
            ])
        );
    }

    #[test]
    fn test_and_filter_order_is_fixed() {
        let group = FilterGroup::default()
            .with_filter(LineageFilter::new(["XBB"]))
            .with_filter(RepliconFilter::new("NC_045512.2"))
            .with_filter(ProfileFilter::notation("del:22029-22034"))
            .with_filter(PropertyFilter::new("lab", FilterType::Exact, "RKI"));
        let compiled = compile(&group);
        let kinds: Vec<&str> = compiled
            .and_filter
            .iter()
            .map(|r| match r {
                FilterRecord::Property(_) => "property",
                FilterRecord::Profile(_) => "profile",
                FilterRecord::Replicon(_) => "replicon",
                FilterRecord::Lineage(_) => "lineage",
            })
            .collect();
        assert_eq!(kinds, vec!["property", "profile", "replicon", "lineage"]);
    }

    #[test]
    fn test_or_groups_preserve_child_order() {
        let a = FilterGroup::default().with_filter(PropertyFilter::new("lab", FilterType::Exact, "A"));
        let b = FilterGroup::default().with_filter(PropertyFilter::new("lab", FilterType::Exact, "B"));

        let ab = compile(&FilterGroup::default().with_group(a.clone()).with_group(b.clone()));
        let ba = compile(&FilterGroup::default().with_group(b).with_group(a));

        assert_eq!(ab.or_filter.len(), 2);
        assert_eq!(ab.or_filter[0], ba.or_filter[1]);
        assert_eq!(ab.or_filter[1], ba.or_filter[0]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_nested_groups_recurse() {
        let leaf = FilterGroup::default().with_filter(RepliconFilter::new("MN908947.3"));
        let middle = FilterGroup::default().with_group(leaf);
        let root = FilterGroup::default().with_group(middle);

        let compiled = compile(&root);
        assert!(compiled.and_filter.is_empty());
        assert_eq!(compiled.or_filter[0].or_filter[0].and_filter.len(), 1);
    }

    #[test]
    fn test_has_property_filter() {
        let dated = FilterGroup::default().with_filter(PropertyFilter::new(
            "collection_date",
            FilterType::Range,
            vec![day(2024, 1, 1), day(2024, 2, 1)],
        ));
        let root = FilterGroup::default().with_group(dated);
        let compiled = compile(&root);

        assert!(has_property_filter(&compiled, "collection_date"));
        assert!(!has_property_filter(&compiled, "lab"));
    }
}
