// Typed wrappers over the sample browser REST endpoints
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{ApiFailure, Transport};
use crate::query::{encode_params, FilterGroupRoot, Ordering, ParamValue};
use crate::reshape::{self, LineageWeekRecord, WeeklyCount};

type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// One page of samples from `samples/genomes/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplePage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilteredStatistics {
    pub filtered_total_count: u64,
    #[serde(default)]
    pub meta_data_coverage: BTreeMap<String, u64>,
}

/// Database-wide statistics, independent of any filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStatistics {
    #[serde(default)]
    pub samples_total: u64,
    #[serde(default)]
    pub first_sample_date: Option<String>,
    #[serde(default)]
    pub latest_sample_date: Option<String>,
    #[serde(default)]
    pub populated_metadata_fields: Vec<String>,
}

/// A sample property and the value column it is stored in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub query_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Endpoint catalogue over any [`Transport`]
pub struct SampleApi<T: Transport> {
    transport: T,
}

impl<T: Transport> SampleApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Path of a paginated sample list: plain params first, then the filter payload
    pub fn sample_genomes_path(root: &FilterGroupRoot, params: &[(&str, ParamValue)]) -> String {
        let filters = root.to_query_string();
        let plain = encode_params(params);
        match (plain.is_empty(), filters.is_empty()) {
            (true, _) => format!("samples/genomes/{}", filters),
            (false, true) => format!("samples/genomes/?{}", plain),
            (false, false) => format!("samples/genomes/?{}&{}", plain, &filters[1..]),
        }
    }

    pub async fn sample_genomes(
        &self,
        root: &FilterGroupRoot,
        params: &[(&str, ParamValue)],
    ) -> ApiResult<SamplePage> {
        let value = self
            .transport
            .get(&Self::sample_genomes_path(root, params))
            .await?;
        decode(value, "sample list")
    }

    pub async fn sample_genome(&self, name: &str) -> ApiResult<SamplePage> {
        let path = format!("samples/genomes/?{}", encode_params(&[("name", name.into())]));
        decode(self.transport.get(&path).await?, "sample")
    }

    pub async fn filtered_statistics(&self, root: &FilterGroupRoot) -> ApiResult<FilteredStatistics> {
        let value = self
            .transport
            .get(&filtered_path("samples/filtered_statistics/", root, &[]))
            .await?;
        decode(value, "filtered statistics")
    }

    /// Weekly sample counts with empty weeks filled in
    pub async fn samples_per_week(&self, root: &FilterGroupRoot) -> ApiResult<Vec<WeeklyCount>> {
        let value = self
            .transport
            .get(&filtered_path("samples/plot_samples_per_week/", root, &[]))
            .await?;
        reshape::parse_weekly_pairs(&value)
            .and_then(|sparse| reshape::samples_per_week(&sparse))
            .map_err(|e| ApiFailure::unknown(e.to_string()))
    }

    /// Lineage group shares per week, with placeholder records for empty weeks
    pub async fn grouped_lineages_per_week(
        &self,
        root: &FilterGroupRoot,
    ) -> ApiResult<Vec<LineageWeekRecord>> {
        let value = self
            .transport
            .get(&filtered_path(
                "samples/plot_grouped_lineages_per_week/",
                root,
                &[],
            ))
            .await?;
        reshape::parse_grouped_lineages(&value)
            .and_then(|records| reshape::grouped_lineages_per_week(&records))
            .map_err(|e| ApiFailure::unknown(e.to_string()))
    }

    pub async fn metadata_coverage(&self, root: &FilterGroupRoot) -> ApiResult<BTreeMap<String, u64>> {
        let value = self
            .transport
            .get(&filtered_path("samples/plot_metadata_coverage/", root, &[]))
            .await?;
        reshape::parse_category_counts(&value, "metadata_coverage")
            .map_err(|e| ApiFailure::unknown(e.to_string()))
    }

    /// Sample counts per value of one property
    pub async fn plot_custom(
        &self,
        root: &FilterGroupRoot,
        property: &str,
    ) -> ApiResult<BTreeMap<String, u64>> {
        let path = filtered_path("samples/plot_custom/", root, &[("property", property.into())]);
        let value = self.transport.get(&path).await?;
        reshape::parse_category_counts(&value, property)
            .map_err(|e| ApiFailure::unknown(e.to_string()))
    }

    /// Cross tabulation of two properties; the shape depends on the y property type
    pub async fn plot_custom_xy(
        &self,
        root: &FilterGroupRoot,
        x_property: &str,
        y_property: &str,
    ) -> ApiResult<Value> {
        let path = filtered_path(
            "samples/plot_custom_xy/",
            root,
            &[("x_property", x_property.into()), ("y_property", y_property.into())],
        );
        self.transport.get(&path).await
    }

    pub async fn statistics(&self) -> ApiResult<SampleStatistics> {
        decode(self.transport.get("samples/statistics/").await?, "statistics")
    }

    pub async fn property_names(&self) -> ApiResult<Vec<String>> {
        let value = self.transport.get("properties/distinct_property_names/").await?;
        Ok(string_list(&value, "property_names"))
    }

    pub async fn all_properties(&self) -> ApiResult<Vec<PropertyDefinition>> {
        let value = self.transport.get("properties/get_all_properties/").await?;
        decode(value["values"].clone(), "property definitions")
    }

    /// Distinct values of one property, stringified
    pub async fn property_values(&self, property_name: &str) -> ApiResult<Vec<String>> {
        let path = format!(
            "properties/distinct_properties/?{}",
            encode_params(&[("property_name", property_name.into())])
        );
        let value = self.transport.get(&path).await?;
        Ok(string_list(&value, "values"))
    }

    pub async fn replicon_accessions(&self) -> ApiResult<Vec<String>> {
        let value = self.transport.get("replicons/distinct_accessions/").await?;
        Ok(string_list(&value, "accessions"))
    }

    pub async fn lineages(&self) -> ApiResult<Vec<String>> {
        let value = self.transport.get("lineages/distinct_lineages/").await?;
        Ok(string_list(&value, "lineages"))
    }

    pub async fn gene_symbols(&self) -> ApiResult<Vec<String>> {
        let value = self.transport.get("genes/distinct_gene_symbols/").await?;
        Ok(string_list(&value, "gene_symbols"))
    }

    pub async fn unique_mutation_count(&self) -> ApiResult<Value> {
        self.transport.get("mutations/distinct_mutations_count/").await
    }

    /// Absolute URL of a streamed CSV export. `name` is always the first column.
    pub fn export_url(&self, root: &FilterGroupRoot, columns: &[String], ordering: &Ordering) -> String {
        let mut export_columns = vec!["name".to_string()];
        export_columns.extend(columns.iter().filter(|c| c.as_str() != "name").cloned());
        let params = [
            ("columns", ParamValue::from(export_columns.join(","))),
            ("ordering", ordering.to_string().into()),
            ("csv_stream", true.into()),
        ];
        format!(
            "{}{}",
            self.transport.base_address(),
            filtered_path("samples/genomes/", root, &params)
        )
    }
}

/// `endpoint` + filter payload, then any plain params
fn filtered_path(endpoint: &str, root: &FilterGroupRoot, params: &[(&str, ParamValue)]) -> String {
    let filters = root.to_query_string();
    let plain = encode_params(params);
    match (filters.is_empty(), plain.is_empty()) {
        (_, true) => format!("{}{}", endpoint, filters),
        (true, false) => format!("{}?{}", endpoint, plain),
        (false, false) => format!("{}{}&{}", endpoint, filters, plain),
    }
}

fn decode<D: DeserializeOwned>(value: Value, what: &str) -> ApiResult<D> {
    serde_json::from_value(value)
        .map_err(|e| ApiFailure::unknown(format!("Unexpected {} response: {}", what, e)))
}

/// String list under `key`; non-string entries are stringified and nulls dropped
fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        _ => {
            tracing::debug!(key, "response has no list under key");
            Vec::new()
        }
    }
}
