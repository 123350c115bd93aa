// Integration test: UI filter tree -> compiled filters -> scoped payload -> query string
use chrono::{FixedOffset, TimeZone};
use serde_json::json;
use sonar_query::filters::{
    compile, FilterGroup, FilterGroupFilters, FilterType, LineageFilter, ProfileCriterion,
    ProfileFilter, PropertyFilter, RepliconFilter,
};
use sonar_query::query::{
    parse_query_string, FilterGroupRoot, Pagination, ReferenceScope, EMPTY_DATASET,
};

fn date_range_filter(start: (i32, u32, u32), end: (i32, u32, u32)) -> PropertyFilter {
    // UTC+2, as if picked in a browser in central Europe
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    PropertyFilter::new(
        "collection_date",
        FilterType::Range,
        vec![
            tz.with_ymd_and_hms(start.0, start.1, start.2, 0, 0, 0).unwrap(),
            tz.with_ymd_and_hms(end.0, end.1, end.2, 0, 0, 0).unwrap(),
        ],
    )
}

#[test]
fn test_empty_tree_compiles_to_empty_filters() {
    let nested = FilterGroup::default()
        .with_group(FilterGroup::default())
        .with_group(FilterGroup::default().with_group(FilterGroup::default()));

    let compiled = compile(&FilterGroup::default());
    assert_eq!(
        serde_json::to_value(&compiled).unwrap(),
        json!({"andFilter": [], "orFilter": []})
    );
    assert_eq!(compile(&FilterGroup::initial("collection_date")), FilterGroupFilters::default());

    // empty children still show up as empty OR-groups
    let compiled = compile(&nested);
    assert!(compiled.and_filter.is_empty());
    assert_eq!(compiled.or_filter.len(), 2);
    assert_eq!(compiled.or_filter[1].or_filter.len(), 1);
}

#[test]
fn test_date_range_scenario() {
    let group = FilterGroup::default().with_filter(date_range_filter((2024, 1, 1), (2024, 1, 5)));
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
fn test_tree_from_ui_json() {
    let group: FilterGroup = serde_json::from_value(json!({
        "filterGroups": [
            {
                "filterGroups": [],
                "filters": {
                    "propertyFilters": [],
                    "profileFilters": [],
                    "repliconFilters": [{"label": "Replicon", "accession": "OQ331004.1", "exclude": true}],
                    "lineageFilter": {"label": "Lineages", "lineageList": [], "exclude": false,
                                      "includeSublineages": true, "isVisible": true}
                }
            }
        ],
        "filters": {
            "propertyFilters": [
                {"label": "Property", "propertyName": "lab", "filterType": "exact", "value": "RKI"},
                {"label": "Property", "propertyName": "host", "filterType": null, "value": "human"}
            ],
            "profileFilters": [
                {"label": "SNP AA", "kind": "snp_aa", "proteinSymbol": "S", "refAA": "N",
                 "refPos": "501", "altAA": "Y", "exclude": false},
                {"label": "Del Nt", "kind": "del_nt", "geneSymbol": "ORF1ab",
                 "firstDeleted": "", "lastDeleted": "11296", "exclude": false}
            ],
            "repliconFilters": [],
            "lineageFilter": {"label": "Lineages", "lineageList": ["BA.2"], "exclude": false,
                              "includeSublineages": false, "isVisible": true}
        }
    }))
    .unwrap();

    let compiled = serde_json::to_value(compile(&group)).unwrap();
    assert_eq!(
        compiled,
        json!({
            "andFilter": [
                {"label": "Property", "property_name": "lab", "filter_type": "exact", "value": "RKI"},
                {"label": "SNP AA", "protein_symbol": "S", "ref_aa": "N", "ref_pos": "501",
                 "alt_aa": "Y", "exclude": false},
                {"label": "Lineages", "lineageList": ["BA.2"], "exclude": false,
                 "includeSublineages": false, "isVisible": true}
            ],
            "orFilter": [
                {"andFilter": [{"label": "Replicon", "accession": "OQ331004.1", "exclude": true}],
                 "orFilter": []}
            ]
        })
    );
}

#[test]
fn test_tree_under_edit_keeps_complete_filters() {
    let group: FilterGroup = serde_json::from_value(json!({
        "filterGroups": [],
        "filters": {
            "propertyFilters": [
                {"label": "Property", "propertyName": "host", "filterType": "", "value": "human"},
                {"label": "Property", "propertyName": "zip_code", "filterType": "exact", "value": "10115"},
                {"label": "Property", "propertyName": "collection_date", "filterType": "exact",
                 "value": ["2024-01-01T00:00:00+01:00", "2024-01-05T00:00:00+01:00"]}
            ],
            "profileFilters": [
                {"label": "DNA/AA Profile", "value": "S:N501Y", "exclude": false},
                {"label": "DNA/AA Profile", "value": "", "exclude": false}
            ],
            "repliconFilters": [],
            "lineageFilter": {"label": "Lineages", "lineageList": [], "exclude": false,
                              "includeSublineages": true, "isVisible": true}
        }
    }))
    .unwrap();

    let compiled = serde_json::to_value(compile(&group)).unwrap();
    assert_eq!(
        compiled,
        json!({
            "andFilter": [
                {"label": "Property", "property_name": "zip_code", "filter_type": "exact",
                 "value": "10115"},
                {"label": "Property", "property_name": "collection_date", "filter_type": "range",
                 "value": "2024-01-01,2024-01-05"},
                {"label": "DNA/AA Profile", "value": "S:N501Y", "exclude": false}
            ],
            "orFilter": []
        })
    );
}

#[test]
fn test_or_groups_keep_child_order() {
    let first = FilterGroup::default().with_filter(RepliconFilter::new("A"));
    let second = FilterGroup::default().with_filter(RepliconFilter::new("B"));

    let ab = compile(&FilterGroup::default().with_group(first.clone()).with_group(second.clone()));
    let ba = compile(&FilterGroup::default().with_group(second).with_group(first));

    assert_ne!(ab, ba);
    assert_eq!(ab.or_filter[0], ba.or_filter[1]);
    assert_eq!(ab.or_filter[1], ba.or_filter[0]);
}

#[test]
fn test_profile_with_empty_field_is_dropped() {
    let criterion = ProfileCriterion::SnpNt {
        gene_symbol: "S".to_string(),
        ref_nuc: "A".to_string(),
        ref_pos: String::new(),
        alt_nuc: "G".to_string(),
    };
    let group = FilterGroup::default()
        .with_filter(ProfileFilter::new(criterion))
        .with_filter(ProfileFilter::notation("S:N501Y").excluded());

    let compiled = compile(&group);
    assert_eq!(compiled.and_filter.len(), 1);
    assert_eq!(
        serde_json::to_value(&compiled.and_filter[0]).unwrap(),
        json!({"label": "DNA/AA Profile", "value": "S:N501Y", "exclude": true})
    );
}

#[test]
fn test_normalize_then_compile_matches_direct_compile() {
    let mut filter = date_range_filter((2024, 3, 1), (2024, 3, 31));
    filter.filter_type = Some(FilterType::Exact);

    let mut group = FilterGroup::default().with_group(FilterGroup::default().with_filter(filter));
    let before = compile(&group);
    group.normalize_date_ranges();

    assert_eq!(
        group.filter_groups[0].filters.property_filters[0].filter_type,
        Some(FilterType::Range)
    );
    assert_eq!(compile(&group), before);
}

#[test]
fn test_full_payload_round_trip() {
    let group = FilterGroup::default()
        .with_filter(date_range_filter((2023, 12, 25), (2024, 1, 7)))
        .with_filter(LineageFilter::new(["XBB.1.5"]))
        .with_group(FilterGroup::default().with_filter(PropertyFilter::new(
            "zip_code",
            FilterType::Startswith,
            "10",
        )));

    let root = FilterGroupRoot::from_group(&group)
        .with_dataset_scope(&["covid".to_string(), EMPTY_DATASET.to_string()])
        .with_reference_scope("NC_045512.2", ReferenceScope::Filter)
        .with_page(Pagination::new(25, 50));

    let query = root.to_query_string();
    assert!(query.starts_with("?filters="));
    assert!(query.contains("&limit=25&offset=50"));

    let decoded = parse_query_string(&query).unwrap();
    assert_eq!(decoded, root);

    let and_filter = serde_json::to_value(&decoded.filters.and_filter).unwrap();
    assert_eq!(
        and_filter[0],
        json!({"label": "Reference", "accession": "NC_045512.2", "exclude": false})
    );
    assert_eq!(and_filter[1]["value"], json!(["covid", ""]));
    assert_eq!(and_filter[2]["value"], json!("2023-12-25,2024-01-07"));
}

#[test]
fn test_single_date_is_omitted_from_query() {
    let tz = FixedOffset::east_opt(0).unwrap();
    let single = PropertyFilter::new(
        "collection_date",
        FilterType::Range,
        vec![tz.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()],
    );
    let group = FilterGroup::default().with_filter(single);
    let root = FilterGroupRoot::from_group(&group);

    // compiled, but with an empty value
    assert_eq!(root.filters.and_filter.len(), 1);
    assert!(root.filters.and_filter[0].has_empty_value());

    let decoded = parse_query_string(&root.to_query_string()).unwrap();
    assert!(decoded.filters.and_filter.is_empty());
}
