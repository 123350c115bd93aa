// Per-key option lists (distinct values, lineages, accessions), fetched once per session
use ahash::AHashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::client::{ApiFailure, SampleApi, Transport};

/// Populate-once cache shared between concurrent requests.
///
/// Entries are never invalidated; failed fetches are not cached.
#[derive(Debug, Clone, Default)]
pub struct OptionsCache {
    entries: Arc<RwLock<AHashMap<String, Arc<Vec<String>>>>>,
}

impl OptionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<String>>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Store `values` unless the key is already populated; returns the cached list
    pub fn insert_once(&self, key: &str, values: Vec<String>) -> Arc<Vec<String>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(values))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached list for `key`, running `fetch` on a miss.
    ///
    /// Two concurrent misses may both fetch; the first stored result wins.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<Vec<String>>, ApiFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, ApiFailure>>,
    {
        if let Some(values) = self.get(key) {
            return Ok(values);
        }
        tracing::debug!(key, "options cache miss");
        let values = fetch().await?;
        Ok(self.insert_once(key, values))
    }

    pub async fn property_values<T: Transport>(
        &self,
        api: &SampleApi<T>,
        property_name: &str,
    ) -> Result<Arc<Vec<String>>, ApiFailure> {
        let key = format!("property:{}", property_name);
        self.get_or_fetch(&key, || api.property_values(property_name))
            .await
    }

    pub async fn lineages<T: Transport>(&self, api: &SampleApi<T>) -> Result<Arc<Vec<String>>, ApiFailure> {
        self.get_or_fetch("lineages", || api.lineages()).await
    }

    pub async fn replicon_accessions<T: Transport>(
        &self,
        api: &SampleApi<T>,
    ) -> Result<Arc<Vec<String>>, ApiFailure> {
        self.get_or_fetch("accessions", || api.replicon_accessions())
            .await
    }

    pub async fn gene_symbols<T: Transport>(&self, api: &SampleApi<T>) -> Result<Arc<Vec<String>>, ApiFailure> {
        self.get_or_fetch("gene_symbols", || api.gene_symbols()).await
    }
}
