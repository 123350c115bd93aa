// Filter value model: the four criteria kinds an AND-set can hold
use chrono::{DateTime, FixedOffset};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Lookup operator understood by the backend query parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Exact,
    Iexact,
    Contains,
    Icontains,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    Startswith,
    Istartswith,
    Endswith,
    Iendswith,
    Range,
    Isnull,
    Regex,
    Iregex,
}

impl FilterType {
    pub const ALL: [FilterType; 17] = [
        FilterType::Exact,
        FilterType::Iexact,
        FilterType::Contains,
        FilterType::Icontains,
        FilterType::In,
        FilterType::Gt,
        FilterType::Gte,
        FilterType::Lt,
        FilterType::Lte,
        FilterType::Startswith,
        FilterType::Istartswith,
        FilterType::Endswith,
        FilterType::Iendswith,
        FilterType::Range,
        FilterType::Isnull,
        FilterType::Regex,
        FilterType::Iregex,
    ];

    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Exact => "exact",
            FilterType::Iexact => "iexact",
            FilterType::Contains => "contains",
            FilterType::Icontains => "icontains",
            FilterType::In => "in",
            FilterType::Gt => "gt",
            FilterType::Gte => "gte",
            FilterType::Lt => "lt",
            FilterType::Lte => "lte",
            FilterType::Startswith => "startswith",
            FilterType::Istartswith => "istartswith",
            FilterType::Endswith => "endswith",
            FilterType::Iendswith => "iendswith",
            FilterType::Range => "range",
            FilterType::Isnull => "isnull",
            FilterType::Regex => "regex",
            FilterType::Iregex => "iregex",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown filter type '{}'", s))
    }
}

/// Storage type of a sample property column, which restricts the legal operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Date,
    Integer,
    Other,
}

impl ColumnKind {
    /// Map a backend `query_type` (e.g. `value_varchar`) to a column kind
    pub fn from_query_type(query_type: &str) -> Self {
        match query_type {
            "value_varchar" => ColumnKind::String,
            "value_date" => ColumnKind::Date,
            "value_integer" => ColumnKind::Integer,
            _ => ColumnKind::Other,
        }
    }

    /// Operators a filter on a column of this kind may use
    pub fn allowed_filter_types(&self) -> &'static [FilterType] {
        static STRING: [FilterType; 3] = [FilterType::Exact, FilterType::Contains, FilterType::Regex];
        static DATE: [FilterType; 1] = [FilterType::Range];
        static INTEGER: [FilterType; 7] = [
            FilterType::Exact,
            FilterType::Gt,
            FilterType::Gte,
            FilterType::Lt,
            FilterType::Lte,
            FilterType::Range,
            FilterType::In,
        ];

        match self {
            ColumnKind::String => &STRING,
            ColumnKind::Date => &DATE,
            ColumnKind::Integer => &INTEGER,
            ColumnKind::Other => &FilterType::ALL,
        }
    }
}

/// Value side of a property comparison as edited in the UI.
///
/// Date picks arrive either as `{"dates": [...]}` or as a bare array of
/// RFC 3339 timestamps; an array only counts as dates when every entry parses.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    /// Calendar picks, each carrying the offset the user picked it in
    Dates { dates: Vec<DateTime<FixedOffset>> },
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// Whether the value counts as set. Empty text, empty lists, zero and null do not.
    pub fn is_present(&self) -> bool {
        match self {
            PropertyValue::Null => false,
            PropertyValue::Dates { dates } => !dates.is_empty(),
            PropertyValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropertyValue::Text(s) => !s.is_empty(),
            PropertyValue::List(items) => !items.is_empty(),
        }
    }

    pub fn dates(&self) -> Option<&[DateTime<FixedOffset>]> {
        match self {
            PropertyValue::Dates { dates } => Some(dates),
            _ => None,
        }
    }

    /// String form sent on the wire; lists are comma-joined
    pub fn to_wire_string(&self) -> String {
        match self {
            PropertyValue::Null => String::new(),
            PropertyValue::Dates { dates } => dates
                .iter()
                .map(|d| d.to_rfc3339())
                .collect::<Vec<_>>()
                .join(","),
            PropertyValue::Number(n) => n.to_string(),
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::List(items) => items.join(","),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPropertyValue {
    Null,
    Dates { dates: Vec<DateTime<FixedOffset>> },
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<RawPropertyValue> for PropertyValue {
    fn from(raw: RawPropertyValue) -> Self {
        match raw {
            RawPropertyValue::Null => PropertyValue::Null,
            RawPropertyValue::Dates { dates } => PropertyValue::Dates { dates },
            RawPropertyValue::Number(n) => PropertyValue::Number(n),
            RawPropertyValue::Text(s) => PropertyValue::Text(s),
            RawPropertyValue::List(items) if items.is_empty() => PropertyValue::List(items),
            RawPropertyValue::List(items) => {
                match items
                    .iter()
                    .map(|item| DateTime::parse_from_rfc3339(item))
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(dates) => PropertyValue::Dates { dates },
                    Err(_) => PropertyValue::List(items),
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawPropertyValue::deserialize(deserializer).map(Into::into)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<Vec<DateTime<FixedOffset>>> for PropertyValue {
    fn from(dates: Vec<DateTime<FixedOffset>>) -> Self {
        PropertyValue::Dates { dates }
    }
}

/// Comparison on a named sample metadata column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub label: String,
    pub property_name: String,
    /// `None` while the operator is unset; unknown names read as unset
    #[serde(default, deserialize_with = "lenient_filter_type")]
    pub filter_type: Option<FilterType>,
    #[serde(default)]
    pub value: PropertyValue,
    /// UI hint: load distinct values for this column when shown
    #[serde(default)]
    pub fetch_options: bool,
}

fn lenient_filter_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<FilterType>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse() {
        Ok(filter_type) => Some(filter_type),
        Err(_) => {
            if !name.is_empty() {
                tracing::debug!(filter_type = %name, "ignoring unknown filter type");
            }
            None
        }
    }))
}

impl PropertyFilter {
    pub const LABEL: &'static str = "Property";

    pub fn new(
        property_name: impl Into<String>,
        filter_type: FilterType,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            label: Self::LABEL.to_string(),
            property_name: property_name.into(),
            filter_type: Some(filter_type),
            value: value.into(),
            fetch_options: false,
        }
    }

    /// Date-range filter on `property_name` with no dates picked yet
    pub fn empty_date_range(property_name: impl Into<String>) -> Self {
        Self::new(property_name, FilterType::Range, PropertyValue::Dates { dates: vec![] })
    }

    /// Name, operator and value are all set
    pub fn is_complete(&self) -> bool {
        !self.property_name.is_empty() && self.filter_type.is_some() && self.value.is_present()
    }

    /// Operator the filter compiles to: a two-date pick is always a range
    pub fn effective_filter_type(&self) -> Option<FilterType> {
        match self.value.dates() {
            Some(dates) if dates.len() >= 2 => Some(FilterType::Range),
            _ => self.filter_type,
        }
    }

    /// Copy with the operator rewritten to what the value implies.
    /// Run when a date edit is committed so the UI shows `range`.
    pub fn normalized(&self) -> Self {
        Self {
            filter_type: self.effective_filter_type(),
            ..self.clone()
        }
    }
}

/// Criterion part of a profile filter, tagged by mutation kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileCriterion {
    /// Free-text mutation notation such as `S:N501Y` or `del:22029-22034`
    Notation { value: String },
    #[serde(rename_all = "camelCase")]
    SnpNt {
        gene_symbol: String,
        ref_nuc: String,
        ref_pos: String,
        alt_nuc: String,
    },
    SnpAa {
        #[serde(rename = "proteinSymbol")]
        protein_symbol: String,
        #[serde(rename = "refAA")]
        ref_aa: String,
        #[serde(rename = "refPos")]
        ref_pos: String,
        #[serde(rename = "altAA")]
        alt_aa: String,
    },
    #[serde(rename_all = "camelCase")]
    DelNt {
        gene_symbol: String,
        first_deleted: String,
        last_deleted: String,
    },
    #[serde(rename_all = "camelCase")]
    DelAa {
        protein_symbol: String,
        first_deleted: String,
        last_deleted: String,
    },
    #[serde(rename_all = "camelCase")]
    InsNt {
        gene_symbol: String,
        ref_nuc: String,
        ref_pos: String,
        alt_nuc: String,
    },
    InsAa {
        #[serde(rename = "proteinSymbol")]
        protein_symbol: String,
        #[serde(rename = "refAA")]
        ref_aa: String,
        #[serde(rename = "refPos")]
        ref_pos: String,
        #[serde(rename = "altAA")]
        alt_aa: String,
    },
}

impl ProfileCriterion {
    /// Label the backend dispatches on for this kind
    pub fn default_label(&self) -> &'static str {
        match self {
            ProfileCriterion::Notation { .. } => "DNA/AA Profile",
            ProfileCriterion::SnpNt { .. } => "SNP Nt",
            ProfileCriterion::SnpAa { .. } => "SNP AA",
            ProfileCriterion::DelNt { .. } => "Del Nt",
            ProfileCriterion::DelAa { .. } => "Del AA",
            ProfileCriterion::InsNt { .. } => "Ins Nt",
            ProfileCriterion::InsAa { .. } => "Ins AA",
        }
    }

    /// Fields under their display (camelCase) names, in declaration order
    pub fn display_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            ProfileCriterion::Notation { value } => vec![("value", value.as_str())],
            ProfileCriterion::SnpNt {
                gene_symbol,
                ref_nuc,
                ref_pos,
                alt_nuc,
            }
            | ProfileCriterion::InsNt {
                gene_symbol,
                ref_nuc,
                ref_pos,
                alt_nuc,
            } => vec![
                ("geneSymbol", gene_symbol.as_str()),
                ("refNuc", ref_nuc.as_str()),
                ("refPos", ref_pos.as_str()),
                ("altNuc", alt_nuc.as_str()),
            ],
            ProfileCriterion::SnpAa {
                protein_symbol,
                ref_aa,
                ref_pos,
                alt_aa,
            }
            | ProfileCriterion::InsAa {
                protein_symbol,
                ref_aa,
                ref_pos,
                alt_aa,
            } => vec![
                ("proteinSymbol", protein_symbol.as_str()),
                ("refAA", ref_aa.as_str()),
                ("refPos", ref_pos.as_str()),
                ("altAA", alt_aa.as_str()),
            ],
            ProfileCriterion::DelNt {
                gene_symbol,
                first_deleted,
                last_deleted,
            } => vec![
                ("geneSymbol", gene_symbol.as_str()),
                ("firstDeleted", first_deleted.as_str()),
                ("lastDeleted", last_deleted.as_str()),
            ],
            ProfileCriterion::DelAa {
                protein_symbol,
                first_deleted,
                last_deleted,
            } => vec![
                ("proteinSymbol", protein_symbol.as_str()),
                ("firstDeleted", first_deleted.as_str()),
                ("lastDeleted", last_deleted.as_str()),
            ],
        }
    }
}

/// A single display field of a profile filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField<'a> {
    Text(&'a str),
    Flag(bool),
}

impl ProfileField<'_> {
    pub fn is_truthy(&self) -> bool {
        match self {
            ProfileField::Text(s) => !s.is_empty(),
            ProfileField::Flag(b) => *b,
        }
    }
}

/// Match against a sample's genomic or proteomic mutation profile.
///
/// A filter without a `kind` tag is read as a notation filter, the shape of
/// the free-text profile input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFilter {
    pub label: String,
    #[serde(flatten)]
    pub criterion: ProfileCriterion,
    #[serde(default)]
    pub exclude: bool,
}

#[derive(Deserialize)]
struct TaggedProfileFilter {
    label: String,
    #[serde(flatten)]
    criterion: ProfileCriterion,
    #[serde(default)]
    exclude: bool,
}

impl<'de> Deserialize<'de> for ProfileFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        if !fields.contains_key("kind") {
            fields.insert("kind".to_string(), Value::String("notation".to_string()));
        }
        let tagged: TaggedProfileFilter =
            serde_json::from_value(Value::Object(fields)).map_err(D::Error::custom)?;
        Ok(Self {
            label: tagged.label,
            criterion: tagged.criterion,
            exclude: tagged.exclude,
        })
    }
}

impl ProfileFilter {
    /// Filter labelled after its criterion kind
    pub fn new(criterion: ProfileCriterion) -> Self {
        Self {
            label: criterion.default_label().to_string(),
            criterion,
            exclude: false,
        }
    }

    pub fn notation(value: impl Into<String>) -> Self {
        Self::new(ProfileCriterion::Notation {
            value: value.into(),
        })
    }

    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// All fields in display order: label, criterion fields, exclude
    pub fn fields(&self) -> Vec<(&'static str, ProfileField<'_>)> {
        let mut fields = vec![("label", ProfileField::Text(&self.label))];
        fields.extend(
            self.criterion
                .display_fields()
                .into_iter()
                .map(|(key, value)| (key, ProfileField::Text(value))),
        );
        fields.push(("exclude", ProfileField::Flag(self.exclude)));
        fields
    }

    /// Every field other than `exclude` is set
    pub fn is_complete(&self) -> bool {
        self.fields()
            .iter()
            .all(|(key, value)| *key == "exclude" || value.is_truthy())
    }
}

/// Restrict to samples aligned against a replicon accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepliconFilter {
    pub label: String,
    pub accession: String,
    #[serde(default)]
    pub exclude: bool,
}

impl RepliconFilter {
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            label: "Replicon".to_string(),
            accession: accession.into(),
            exclude: false,
        }
    }
}

/// Lineage membership. One per AND-set: a sample has exactly one lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageFilter {
    pub label: String,
    pub lineage_list: Vec<String>,
    #[serde(default)]
    pub exclude: bool,
    #[serde(default = "default_true")]
    pub include_sublineages: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

fn default_true() -> bool {
    true
}

impl LineageFilter {
    pub fn new(lineages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            lineage_list: lineages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.lineage_list.is_empty()
    }
}

impl Default for LineageFilter {
    fn default() -> Self {
        Self {
            label: "Lineages".to_string(),
            lineage_list: Vec::new(),
            exclude: false,
            include_sublineages: true,
            is_visible: true,
        }
    }
}

/// Any filter an AND-set can hold, discriminated by an explicit tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenomeFilter {
    Property(PropertyFilter),
    Profile(ProfileFilter),
    Replicon(RepliconFilter),
    Lineage(LineageFilter),
}

impl From<PropertyFilter> for GenomeFilter {
    fn from(filter: PropertyFilter) -> Self {
        GenomeFilter::Property(filter)
    }
}

impl From<ProfileFilter> for GenomeFilter {
    fn from(filter: ProfileFilter) -> Self {
        GenomeFilter::Profile(filter)
    }
}

impl From<RepliconFilter> for GenomeFilter {
    fn from(filter: RepliconFilter) -> Self {
        GenomeFilter::Replicon(filter)
    }
}

impl From<LineageFilter> for GenomeFilter {
    fn from(filter: LineageFilter) -> Self {
        GenomeFilter::Lineage(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filter_type_round_trips_through_str() {
        for t in FilterType::ALL {
            assert_eq!(t.as_str().parse::<FilterType>().unwrap(), t);
        }
        assert!("between".parse::<FilterType>().is_err());
    }

    #[test]
    fn test_filter_type_serializes_lowercase() {
        let json = serde_json::to_string(&FilterType::Istartswith).unwrap();
        assert_eq!(json, "\"istartswith\"");
    }

    #[test]
    fn test_column_kind_restrictions() {
        assert_eq!(ColumnKind::Date.allowed_filter_types(), &[FilterType::Range]);
        assert_eq!(
            ColumnKind::from_query_type("value_varchar").allowed_filter_types(),
            &[FilterType::Exact, FilterType::Contains, FilterType::Regex]
        );
        assert_eq!(ColumnKind::from_query_type("value_float").allowed_filter_types().len(), 17);
    }

    #[test]
    fn test_value_presence() {
        assert!(!PropertyValue::Null.is_present());
        assert!(!PropertyValue::Text(String::new()).is_present());
        assert!(!PropertyValue::Number(0.0).is_present());
        assert!(!PropertyValue::List(vec![]).is_present());
        assert!(!PropertyValue::Dates { dates: vec![] }.is_present());
        assert!(PropertyValue::Number(3.0).is_present());
        assert!(PropertyValue::List(vec!["a".into()]).is_present());
    }

    #[test]
    fn test_value_wire_string() {
        assert_eq!(PropertyValue::Number(5.0).to_wire_string(), "5");
        assert_eq!(PropertyValue::Number(2.5).to_wire_string(), "2.5");
        assert_eq!(
            PropertyValue::List(vec!["X".into(), "N".into()]).to_wire_string(),
            "X,N"
        );
    }

    #[test]
    fn test_property_value_deserializes_untagged() {
        let v: PropertyValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, PropertyValue::Null);
        let v: PropertyValue = serde_json::from_str("\"Berlin\"").unwrap();
        assert_eq!(v, PropertyValue::Text("Berlin".into()));
        let v: PropertyValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(v, PropertyValue::List(vec!["a".into(), "b".into()]));
        let v: PropertyValue =
            serde_json::from_str(r#"{"dates":["2024-01-01T00:00:00+01:00"]}"#).unwrap();
        assert_eq!(v.dates().map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_normalized_sets_range_for_two_dates() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let dates = vec![
            tz.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            tz.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        ];
        let filter = PropertyFilter::new("collection_date", FilterType::Exact, dates);
        let normalized = filter.normalized();
        assert_eq!(normalized.filter_type, Some(FilterType::Range));
        // source untouched
        assert_eq!(filter.filter_type, Some(FilterType::Exact));
    }

    #[test]
    fn test_profile_fields_order() {
        let filter = ProfileFilter::new(ProfileCriterion::SnpAa {
            protein_symbol: "S".into(),
            ref_aa: "N".into(),
            ref_pos: "501".into(),
            alt_aa: "Y".into(),
        });
        let keys: Vec<&str> = filter.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["label", "proteinSymbol", "refAA", "refPos", "altAA", "exclude"]
        );
        assert_eq!(filter.label, "SNP AA");
    }

    #[test]
    fn test_profile_completeness_ignores_exclude() {
        assert!(ProfileFilter::notation("S:N501Y").is_complete());
        assert!(!ProfileFilter::notation("").is_complete());

        let mut unlabeled = ProfileFilter::notation("S:N501Y").excluded();
        unlabeled.label.clear();
        assert!(!unlabeled.is_complete());
    }

    #[test]
    fn test_profile_filter_json_uses_display_names() {
        let filter = ProfileFilter::new(ProfileCriterion::DelAa {
            protein_symbol: "ORF1ab".into(),
            first_deleted: "3675".into(),
            last_deleted: "3677".into(),
        });
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["kind"], "del_aa");
        assert_eq!(json["proteinSymbol"], "ORF1ab");
        assert_eq!(json["firstDeleted"], "3675");

        let back: ProfileFilter = serde_json::from_value(json).unwrap();
        assert_eq!(back, filter);
    }

    #[test]
    fn test_profile_filter_without_kind_is_notation() {
        let filter: ProfileFilter = serde_json::from_value(serde_json::json!({
            "label": "DNA/AA Profile", "value": "S:N501Y", "exclude": true
        }))
        .unwrap();
        assert_eq!(filter, ProfileFilter::notation("S:N501Y").excluded());

        // fresh input box
        let blank: ProfileFilter = serde_json::from_value(serde_json::json!({
            "label": "DNA/AA Profile", "value": "", "exclude": false
        }))
        .unwrap();
        assert!(!blank.is_complete());
    }

    #[test]
    fn test_unknown_filter_type_reads_as_unset() {
        for raw in ["\"\"", "\"between\"", "null"] {
            let filter: PropertyFilter = serde_json::from_str(&format!(
                r#"{{"label": "Property", "propertyName": "lab", "filterType": {}, "value": "RKI"}}"#,
                raw
            ))
            .unwrap();
            assert_eq!(filter.filter_type, None);
            assert!(!filter.is_complete());
        }

        let missing: PropertyFilter =
            serde_json::from_str(r#"{"label": "Property", "propertyName": "lab", "value": "RKI"}"#)
                .unwrap();
        assert_eq!(missing.filter_type, None);
    }

    #[test]
    fn test_timestamp_array_reads_as_dates() {
        let v: PropertyValue = serde_json::from_str(
            r#"["2024-01-01T00:00:00+01:00", "2024-01-05T00:00:00+01:00"]"#,
        )
        .unwrap();
        assert_eq!(v.dates().map(|d| d.len()), Some(2));

        // one non-timestamp entry keeps the whole array as text
        let v: PropertyValue =
            serde_json::from_str(r#"["2024-01-01T00:00:00+01:00", "RKI"]"#).unwrap();
        assert!(matches!(v, PropertyValue::List(ref items) if items.len() == 2));

        let v: PropertyValue = serde_json::from_str("[]").unwrap();
        assert_eq!(v, PropertyValue::List(vec![]));
    }

    #[test]
    fn test_genome_filter_tagged() {
        let filter: GenomeFilter = RepliconFilter::new("NC_045512.2").into();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["type"], "replicon");
        assert_eq!(json["accession"], "NC_045512.2");
    }

    #[test]
    fn test_lineage_defaults() {
        let filter = LineageFilter::default();
        assert_eq!(filter.label, "Lineages");
        assert!(filter.include_sublineages);
        assert!(filter.is_visible);
        assert!(!filter.is_active());
        assert!(LineageFilter::new(["BA.2"]).is_active());
    }
}
