//! Mock indexer backend for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::indexer::{
    BackendError, BackendIndexer, IndexerBackend, IndexerDescriptor, RawCategory, SearchSpec,
    TorrentResult,
};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// Backend id of the indexer that was searched.
    pub indexer_id: String,
    /// The spec that was searched.
    pub spec: SearchSpec,
}

impl std::ops::Deref for RecordedSearch {
    type Target = SearchSpec;

    fn deref(&self) -> &SearchSpec {
        &self.spec
    }
}

/// Mock implementation of the IndexerBackend trait.
///
/// Provides controllable behavior for testing:
/// - Configurable indexer listings and per-indexer categories
/// - Configurable search results
/// - Failure injection for every trait method
/// - Recorded searches for assertions
pub struct MockBackend {
    indexers: Arc<RwLock<Vec<BackendIndexer>>>,
    categories: Arc<RwLock<HashMap<String, Vec<RawCategory>>>>,
    category_failures: Arc<RwLock<HashSet<String>>>,
    search_results: Arc<RwLock<HashMap<String, Vec<TorrentResult>>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    fail_list: Arc<RwLock<bool>>,
    fail_search: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend").finish_non_exhaustive()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend with no indexers.
    pub fn new() -> Self {
        Self {
            indexers: Arc::new(RwLock::new(Vec::new())),
            categories: Arc::new(RwLock::new(HashMap::new())),
            category_failures: Arc::new(RwLock::new(HashSet::new())),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            fail_list: Arc::new(RwLock::new(false)),
            fail_search: Arc::new(RwLock::new(false)),
        }
    }

    /// Replace the indexer listing.
    pub async fn set_indexers(&self, indexers: Vec<BackendIndexer>) {
        *self.indexers.write().await = indexers;
    }

    /// Set the categories returned for one indexer id.
    pub async fn set_categories(&self, indexer_id: &str, categories: Vec<RawCategory>) {
        self.categories
            .write()
            .await
            .insert(indexer_id.to_string(), categories);
    }

    /// Make category fetches for one indexer id fail.
    pub async fn fail_categories_for(&self, indexer_id: &str) {
        self.category_failures
            .write()
            .await
            .insert(indexer_id.to_string());
    }

    /// Set the results returned when searching one indexer id.
    pub async fn set_search_results(&self, indexer_id: &str, results: Vec<TorrentResult>) {
        self.search_results
            .write()
            .await
            .insert(indexer_id.to_string(), results);
    }

    /// Make the indexer listing fail.
    pub async fn fail_list(&self, fail: bool) {
        *self.fail_list.write().await = fail;
    }

    /// Make searches fail.
    pub async fn fail_search(&self, fail: bool) {
        *self.fail_search.write().await = fail;
    }

    /// Get recorded searches.
    pub async fn search_calls(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }
}

#[async_trait]
impl IndexerBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_indexers(&self) -> Result<Vec<BackendIndexer>, BackendError> {
        if *self.fail_list.read().await {
            return Err(BackendError::ConnectionFailed(
                "mock listing failure".to_string(),
            ));
        }
        Ok(self.indexers.read().await.clone())
    }

    async fn fetch_categories(
        &self,
        indexer: &BackendIndexer,
    ) -> Result<Vec<RawCategory>, BackendError> {
        if self.category_failures.read().await.contains(&indexer.id) {
            return Err(BackendError::Timeout);
        }
        Ok(self
            .categories
            .read()
            .await
            .get(&indexer.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search(
        &self,
        indexer: &IndexerDescriptor,
        spec: &SearchSpec,
    ) -> Result<Vec<TorrentResult>, BackendError> {
        self.searches.write().await.push(RecordedSearch {
            indexer_id: indexer.id.clone(),
            spec: spec.clone(),
        });

        if *self.fail_search.read().await {
            return Err(BackendError::ApiError("mock search failure".to_string()));
        }

        Ok(self
            .search_results
            .read()
            .await
            .get(&indexer.id)
            .cloned()
            .unwrap_or_default())
    }
}
