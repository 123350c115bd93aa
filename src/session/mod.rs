//! Query sessions
//!
//! A session holds the live filter tree plus paging, ordering and scope,
//! derives the request payload from them, and remembers which tree was last
//! sent so the UI can tell when results are stale.
use crate::client::{SampleApi, SamplePage, Transport};
use crate::config::{Config, ScopeConfig};
use crate::error::{Result, SonarError};
use crate::filters::{has_property_filter, FilterGroup};
use crate::query::{FilterGroupRoot, Ordering, Pagination, ParamValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

mod cache;
mod catalog;

pub use cache::OptionsCache;
pub use catalog::{ColumnCatalog, PREFERRED_COLUMNS, PROFILE_COLUMNS};

/// Property whose presence in a payload counts as a date filter
pub const DATE_PROPERTY: &str = "collection_date";

/// Filter state of one browsing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySession {
    /// Unique session identifier
    pub id: Uuid,

    pub created_at: DateTime<Utc>,

    /// Tree edited by the UI
    pub filter_group: FilterGroup,

    pub pagination: Pagination,

    pub ordering: Ordering,

    #[serde(default)]
    pub scope: ScopeConfig,

    /// Tree as of the last sample request
    #[serde(default)]
    last_sent: Option<FilterGroup>,

    /// Message of the last failed sample request
    #[serde(default)]
    pub error_message: Option<String>,
}

impl QuerySession {
    /// Fresh session with the default tree and the configured defaults
    pub fn new(config: &Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            filter_group: FilterGroup::initial(&config.query.default_property),
            pagination: config.query.pagination(),
            ordering: config.query.ordering(),
            scope: config.scope.clone(),
            last_sent: None,
            error_message: None,
        }
    }

    /// Request payload: compiled tree with data set and reference scope applied.
    /// Recomputed on every call.
    pub fn filters(&self) -> FilterGroupRoot {
        let root = FilterGroupRoot::from_group(&self.filter_group)
            .with_dataset_scope(&self.scope.data_sets);
        match &self.scope.reference_accession {
            Some(accession) => root.with_reference_scope(accession, self.scope.reference_mode),
            None => root,
        }
    }

    /// Whether the payload filters on collection date, at the top level or in a direct OR-group
    pub fn has_date_filter(&self) -> bool {
        has_property_filter(&self.filters().filters, DATE_PROPERTY)
    }

    /// The tree differs from what was last sent, or nothing was sent yet
    pub fn filters_changed(&self) -> bool {
        self.last_sent.as_ref() != Some(&self.filter_group)
    }

    pub fn mark_sent(&mut self) {
        self.last_sent = Some(self.filter_group.clone());
    }

    pub fn set_page(&mut self, pagination: Pagination) {
        self.pagination = pagination;
    }

    /// Change the sort order and go back to the first page
    pub fn set_ordering(&mut self, ordering: Ordering) {
        self.ordering = ordering;
        self.pagination.offset = 0;
    }

    /// Plain list parameters: `limit`, `offset`, `ordering`
    pub fn page_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("limit", self.pagination.limit.into()),
            ("offset", self.pagination.offset.into()),
            ("ordering", self.ordering.to_string().into()),
        ]
    }

    /// Request the current page of samples.
    ///
    /// A failure is recorded in `error_message` and yields `None`; the tree is
    /// marked as sent either way.
    pub async fn fetch_samples<T: Transport>(&mut self, api: &SampleApi<T>) -> Option<SamplePage> {
        self.error_message = None;
        self.mark_sent();

        let root = self.filters();
        match api.sample_genomes(&root, &self.page_params()).await {
            Ok(page) => {
                tracing::info!(count = page.count, session = %self.id, "fetched samples");
                Some(page)
            }
            Err(failure) => {
                tracing::warn!(session = %self.id, "sample request failed: {}", failure);
                self.error_message = Some(failure.user_message());
                None
            }
        }
    }

    /// Save session state as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| SonarError::Json {
            source: e,
            context: "Failed to serialize session state".to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| SonarError::Io {
            source: e,
            context: format!("Failed to write session state file: {}", path.display()),
        })?;
        Ok(())
    }

    /// Load session state saved by [`QuerySession::save`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SonarError::SessionNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SonarError::Io {
            source: e,
            context: format!("Failed to read session state file: {}", path.display()),
        })?;
        serde_json::from_str(&content).map_err(|e| SonarError::Json {
            source: e,
            context: "Failed to deserialize session state".to_string(),
        })
    }
}
