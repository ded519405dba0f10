//! Background indexer sync loop.
//!
//! Periodically asks the backend for its configured indexers, classifies
//! them and reconciles the site registry: new indexers are registered,
//! changed ones are refreshed and vanished ones are deregistered. A failed
//! pass leaves previous registrations untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::indexer::{categories::build_category_map, IndexerBackend, IndexerDescriptor};
use crate::registry::{RegistryError, SiteKey, SiteRegistry};

use super::types::{SyncError, SyncReport, SyncState};

/// The indexer sync service.
pub struct SyncService {
    backend: Arc<dyn IndexerBackend>,
    registry: Arc<dyn SiteRegistry>,
    interval: Duration,
    use_proxy: bool,

    // Runtime state
    state: Arc<RwLock<SyncState>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncService {
    /// Create a new sync service.
    pub fn new(
        backend: Arc<dyn IndexerBackend>,
        registry: Arc<dyn SiteRegistry>,
        interval: Duration,
        use_proxy: bool,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            backend,
            registry,
            interval,
            use_proxy,
            state: Arc::new(RwLock::new(SyncState::new())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Shared handle to the sync state, for the search path.
    pub fn state_handle(&self) -> Arc<RwLock<SyncState>> {
        Arc::clone(&self.state)
    }

    /// Start the sync loop (spawns a background task). The first pass runs
    /// immediately.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync service already running");
            return;
        }

        info!(interval_secs = self.interval.as_secs(), "Starting indexer sync service");
        self.spawn_sync_loop();
    }

    /// Stop the sync loop gracefully.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync service not running");
            return;
        }

        info!("Stopping indexer sync service");
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Run one sync pass now. Safe to call whether or not the loop is
    /// running; passes are serialized through the state lock.
    pub async fn run_pass(&self) -> Result<SyncReport, SyncError> {
        Self::execute_pass(
            &self.backend,
            &self.registry,
            &self.state,
            self.use_proxy,
        )
        .await
    }

    fn spawn_sync_loop(&self) {
        let backend = Arc::clone(&self.backend);
        let registry = Arc::clone(&self.registry);
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let use_proxy = self.use_proxy;
        let interval = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Sync loop started");

            if let Err(e) = Self::execute_pass(&backend, &registry, &state, use_proxy).await {
                warn!("Sync pass failed: {}", e);
            }

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        if let Err(e) = Self::execute_pass(&backend, &registry, &state, use_proxy).await {
                            warn!("Sync pass failed: {}", e);
                        }
                    }
                }
            }
            info!("Sync loop stopped");
        });
    }

    async fn execute_pass(
        backend: &Arc<dyn IndexerBackend>,
        registry: &Arc<dyn SiteRegistry>,
        state: &Arc<RwLock<SyncState>>,
        use_proxy: bool,
    ) -> Result<SyncReport, SyncError> {
        let indexers = backend.list_indexers().await?;

        let mut report = SyncReport {
            obtained: indexers.len(),
            ..Default::default()
        };

        // Classify and build descriptors; per-indexer failures degrade, they
        // never abort the pass
        let mut fresh: HashMap<SiteKey, IndexerDescriptor> = HashMap::new();
        for indexer in indexers {
            if indexer.privacy.is_public() {
                info!(indexer = %indexer.name, "Excluding public indexer");
                report.filtered_public += 1;
                continue;
            }

            let raw_categories = match backend.fetch_categories(&indexer).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        indexer = %indexer.name,
                        error = %e,
                        "Category fetch failed, keeping indexer without categories"
                    );
                    Vec::new()
                }
            };

            let (categories, adult_only) = build_category_map(&raw_categories);
            if adult_only {
                info!(indexer = %indexer.name, "Excluding adult-only indexer");
                report.filtered_adult += 1;
                continue;
            }

            let key = SiteKey::derive(backend.name(), &indexer.id);
            fresh.insert(
                key.clone(),
                IndexerDescriptor {
                    key,
                    id: indexer.id,
                    name: indexer.name,
                    url: indexer.url,
                    privacy: indexer.privacy,
                    use_proxy,
                    categories,
                },
            );
        }

        // Reconcile against the previous pass
        let mut state = state.write().await;

        for (key, descriptor) in &fresh {
            if let Some(existing) = state.get(key) {
                if existing != descriptor {
                    match registry.update(descriptor.clone()) {
                        Ok(()) => {
                            report.updated += 1;
                            state.insert(descriptor.clone());
                        }
                        Err(e) => warn!(site = %key, error = %e, "Failed to refresh site"),
                    }
                }
            } else {
                match registry.register(descriptor.clone()) {
                    Ok(()) => {
                        report.registered += 1;
                        state.insert(descriptor.clone());
                    }
                    Err(RegistryError::AlreadyRegistered(_)) => {
                        // Registry outlived our state (e.g. service restart);
                        // refresh instead
                        match registry.update(descriptor.clone()) {
                            Ok(()) => {
                                report.updated += 1;
                                state.insert(descriptor.clone());
                            }
                            Err(e) => warn!(site = %key, error = %e, "Failed to refresh site"),
                        }
                    }
                    Err(e) => warn!(site = %key, error = %e, "Failed to register site"),
                }
            }
        }

        let vanished: Vec<SiteKey> = state
            .keys()
            .filter(|key| !fresh.contains_key(*key))
            .cloned()
            .collect();

        for key in vanished {
            match registry.deregister(&key) {
                Ok(()) => {
                    report.deregistered += 1;
                    state.remove(&key);
                }
                Err(RegistryError::NotFound(_)) => {
                    debug!(site = %key, "Site already gone from registry");
                    state.remove(&key);
                }
                Err(e) => warn!(site = %key, error = %e, "Failed to deregister site"),
            }
        }

        state.last_run = Some(Utc::now());
        state.last_report = Some(report);

        info!(
            obtained = report.obtained,
            filtered_public = report.filtered_public,
            filtered_adult = report.filtered_adult,
            registered = report.registered,
            updated = report.updated,
            deregistered = report.deregistered,
            "Indexer sync pass complete"
        );

        Ok(report)
    }
}
