//! Site registry abstraction.
//!
//! Discovered indexers are registered as "sites" keyed by an opaque
//! [`SiteKey`]. The key is derived deterministically from the backend name
//! and the backend's indexer id, so repeated sync passes always produce the
//! same key for the same upstream indexer.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indexer::IndexerDescriptor;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Opaque identifier for a registered site.
///
/// Keys have the textual shape `{backend}.{slug}.indexer` but callers must
/// treat them as atoms: the only supported operations are equality, hashing
/// and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteKey(String);

impl SiteKey {
    /// Derive the key for a backend indexer id.
    ///
    /// The id is lowercased and runs of non-alphanumeric characters collapse
    /// to a single `-`, so "Beyond-HD (API)" and "beyond hd api" derive the
    /// same slug.
    pub fn derive(backend: &str, indexer_id: &str) -> Self {
        let lowered = indexer_id.to_lowercase();
        let slug = SLUG_RE.replace_all(&lowered, "-");
        let slug = slug.trim_matches('-');
        Self(format!("{}.{}.indexer", backend, slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Site already registered: {0}")]
    AlreadyRegistered(SiteKey),

    #[error("Site not found: {0}")]
    NotFound(SiteKey),
}

/// Storage for registered sites.
///
/// Implementations must be safe to share across the sync loop and request
/// handlers.
pub trait SiteRegistry: Send + Sync {
    /// Register a new site. Fails if the key is already present.
    fn register(&self, descriptor: IndexerDescriptor) -> Result<(), RegistryError>;

    /// Replace an existing site's descriptor. Fails if the key is absent.
    fn update(&self, descriptor: IndexerDescriptor) -> Result<(), RegistryError>;

    /// Remove a site. Fails if the key is absent.
    fn deregister(&self, key: &SiteKey) -> Result<(), RegistryError>;

    /// Look up a single site.
    fn get(&self, key: &SiteKey) -> Option<IndexerDescriptor>;

    /// List all registered sites, ordered by key.
    fn list(&self) -> Vec<IndexerDescriptor>;
}

/// In-memory registry implementation.
#[derive(Default)]
pub struct MemoryRegistry {
    sites: RwLock<HashMap<SiteKey, IndexerDescriptor>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SiteRegistry for MemoryRegistry {
    fn register(&self, descriptor: IndexerDescriptor) -> Result<(), RegistryError> {
        let mut sites = self.sites.write().unwrap();
        if sites.contains_key(&descriptor.key) {
            return Err(RegistryError::AlreadyRegistered(descriptor.key));
        }
        sites.insert(descriptor.key.clone(), descriptor);
        Ok(())
    }

    fn update(&self, descriptor: IndexerDescriptor) -> Result<(), RegistryError> {
        let mut sites = self.sites.write().unwrap();
        if !sites.contains_key(&descriptor.key) {
            return Err(RegistryError::NotFound(descriptor.key));
        }
        sites.insert(descriptor.key.clone(), descriptor);
        Ok(())
    }

    fn deregister(&self, key: &SiteKey) -> Result<(), RegistryError> {
        let mut sites = self.sites.write().unwrap();
        sites
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }

    fn get(&self, key: &SiteKey) -> Option<IndexerDescriptor> {
        self.sites.read().unwrap().get(key).cloned()
    }

    fn list(&self) -> Vec<IndexerDescriptor> {
        let sites = self.sites.read().unwrap();
        let mut all: Vec<_> = sites.values().cloned().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }
}
