//! Search dispatch.
//!
//! The dispatcher is the public search entry point. It never returns an
//! error: a site we do not manage, a rejected keyword or a backend failure
//! all degrade to an empty result list with a log line, so callers can
//! treat "no results" uniformly.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::indexer::{IndexerBackend, MediaType, QueryKind, SearchSpec, TorrentResult};
use crate::registry::SiteKey;
use crate::sync::SyncState;

pub struct SearchDispatcher {
    backend: Arc<dyn IndexerBackend>,
    state: Arc<RwLock<SyncState>>,
}

impl SearchDispatcher {
    /// Create a dispatcher sharing the sync service's state handle.
    pub fn new(backend: Arc<dyn IndexerBackend>, state: Arc<RwLock<SyncState>>) -> Self {
        Self { backend, state }
    }

    /// Search one managed site.
    pub async fn search(
        &self,
        site: &SiteKey,
        keyword: &str,
        media: Option<MediaType>,
        page: u32,
    ) -> Vec<TorrentResult> {
        let descriptor = {
            let state = self.state.read().await;
            match state.get(site) {
                Some(descriptor) => descriptor.clone(),
                None => {
                    debug!(site = %site, "Ignoring search for unmanaged site");
                    return Vec::new();
                }
            }
        };

        let Some(query) = QueryKind::classify(keyword) else {
            debug!(site = %site, keyword = keyword, "Rejecting non-English keyword");
            return Vec::new();
        };

        let spec = SearchSpec { query, media, page };

        match self.backend.search(&descriptor, &spec).await {
            Ok(results) => results,
            Err(e) => {
                warn!(site = %site, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Search every managed site concurrently and merge the results.
    pub async fn search_all(
        &self,
        keyword: &str,
        media: Option<MediaType>,
        page: u32,
    ) -> Vec<TorrentResult> {
        let keys: Vec<SiteKey> = {
            let state = self.state.read().await;
            state.keys().cloned().collect()
        };

        let searches = keys.iter().map(|key| self.search(key, keyword, media, page));
        let per_site = futures::future::join_all(searches).await;

        per_site.into_iter().flatten().collect()
    }
}
