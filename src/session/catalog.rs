// Column catalogue: which properties can be filtered, shown, and with which operators
use std::collections::BTreeMap;

use crate::client::PropertyDefinition;
use crate::filters::{ColumnKind, FilterType};

/// Columns preferred in the sample table, in display order
pub const PREFERRED_COLUMNS: [&str; 9] = [
    "lineage",
    "collection_date",
    "zip_code",
    "lab",
    "sequencing_tech",
    "sequencing_reason",
    "isolation_source",
    "init_upload_date",
    "last_update_date",
];

/// Profile columns that are always shown first
pub const PROFILE_COLUMNS: [&str; 2] = ["genomic_profiles", "proteomic_profiles"];

const MENU_EXCLUDED: [&str; 3] = ["genomic_profiles", "proteomic_profiles", "lineage"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnCatalog {
    kinds: Vec<(String, ColumnKind)>,
    table_options: Vec<String>,
    menu_options: Vec<String>,
}

impl ColumnCatalog {
    /// Build from the backend property list and the current metadata coverage.
    ///
    /// Table options are properties with at least one populated value, minus
    /// `name` (the fixed ID column). Menu options are `name` followed by the
    /// table options without profile and lineage columns.
    pub fn build(definitions: &[PropertyDefinition], coverage: &BTreeMap<String, u64>) -> Self {
        let kinds: Vec<(String, ColumnKind)> = definitions
            .iter()
            .map(|d| (d.name.clone(), ColumnKind::from_query_type(&d.query_type)))
            .collect();

        let table_options: Vec<String> = kinds
            .iter()
            .map(|(name, _)| name)
            .filter(|name| name.as_str() != "name" && coverage.get(*name).copied().unwrap_or(0) > 0)
            .cloned()
            .collect();

        let menu_options = std::iter::once("name".to_string())
            .chain(
                table_options
                    .iter()
                    .filter(|p| !MENU_EXCLUDED.contains(&p.as_str()))
                    .cloned(),
            )
            .collect();

        Self {
            kinds,
            table_options,
            menu_options,
        }
    }

    pub fn kind_of(&self, property: &str) -> Option<ColumnKind> {
        self.kinds
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, kind)| *kind)
    }

    /// Operators offered for `property`; unknown properties get all of them
    pub fn filter_types_for(&self, property: &str) -> &'static [FilterType] {
        self.kind_of(property)
            .unwrap_or(ColumnKind::Other)
            .allowed_filter_types()
    }

    pub fn table_options(&self) -> &[String] {
        &self.table_options
    }

    pub fn menu_options(&self) -> &[String] {
        &self.menu_options
    }

    /// Columns to show: `current` first, then preferred columns, then the
    /// remaining table options, truncated to `count`
    pub fn default_columns(&self, current: &[String], count: usize) -> Vec<String> {
        let mut columns: Vec<String> = current.to_vec();
        for preferred in PREFERRED_COLUMNS {
            if self.table_options.iter().any(|o| o == preferred)
                && !columns.iter().any(|c| c == preferred)
            {
                columns.push(preferred.to_string());
            }
        }
        for option in &self.table_options {
            if !columns.contains(option) {
                columns.push(option.clone());
            }
        }
        columns.truncate(count);
        columns
    }
}
