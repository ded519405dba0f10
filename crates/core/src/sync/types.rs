use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::indexer::{BackendError, IndexerDescriptor};
use crate::registry::SiteKey;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to fetch indexer list: {0}")]
    ListingFailed(#[from] BackendError),
}

/// Counts from one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Indexers returned by the backend listing
    pub obtained: usize,
    /// Excluded for being public
    pub filtered_public: usize,
    /// Excluded for carrying only adult categories
    pub filtered_adult: usize,
    /// Newly registered this pass
    pub registered: usize,
    /// Already registered, descriptor refreshed
    pub updated: usize,
    /// Removed because the backend no longer lists them
    pub deregistered: usize,
}

/// Owned record of what the sync loop currently has registered.
///
/// The registry is the externally visible store; this state is the sync
/// loop's own memory of it, used to reconcile passes and to answer the
/// "do we manage this site?" question on the search path.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    sites: HashMap<SiteKey, IndexerDescriptor>,
    pub last_run: Option<DateTime<Utc>>,
    pub last_report: Option<SyncReport>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &SiteKey) -> bool {
        self.sites.contains_key(key)
    }

    pub fn get(&self, key: &SiteKey) -> Option<&IndexerDescriptor> {
        self.sites.get(key)
    }

    pub fn insert(&mut self, descriptor: IndexerDescriptor) -> Option<IndexerDescriptor> {
        self.sites.insert(descriptor.key.clone(), descriptor)
    }

    pub fn remove(&mut self, key: &SiteKey) -> Option<IndexerDescriptor> {
        self.sites.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SiteKey> {
        self.sites.keys()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &IndexerDescriptor> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{CategoryMap, PrivacyTier};

    fn descriptor(id: &str) -> IndexerDescriptor {
        IndexerDescriptor {
            key: SiteKey::derive("jackett", id),
            id: id.to_string(),
            name: id.to_string(),
            url: String::new(),
            privacy: PrivacyTier::Private,
            use_proxy: false,
            categories: CategoryMap::default(),
        }
    }

    #[test]
    fn test_state_insert_and_lookup() {
        let mut state = SyncState::new();
        assert!(state.is_empty());

        let desc = descriptor("alpha");
        let key = desc.key.clone();
        assert!(state.insert(desc).is_none());

        assert!(state.contains(&key));
        assert_eq!(state.len(), 1);
        assert_eq!(state.get(&key).unwrap().id, "alpha");
    }

    #[test]
    fn test_state_insert_replaces() {
        let mut state = SyncState::new();
        state.insert(descriptor("alpha"));

        let mut refreshed = descriptor("alpha");
        refreshed.name = "Alpha (renamed)".to_string();
        let previous = state.insert(refreshed);

        assert_eq!(previous.unwrap().name, "alpha");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_state_remove() {
        let mut state = SyncState::new();
        let desc = descriptor("alpha");
        let key = desc.key.clone();
        state.insert(desc);

        assert!(state.remove(&key).is_some());
        assert!(state.remove(&key).is_none());
        assert!(state.is_empty());
    }
}
