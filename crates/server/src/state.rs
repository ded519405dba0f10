use std::sync::Arc;

use indexrelay_core::{Config, SanitizedConfig, SearchDispatcher, SiteRegistry, SyncService};

/// Shared application state
pub struct AppState {
    config: Config,
    registry: Arc<dyn SiteRegistry>,
    sync: Option<Arc<SyncService>>,
    dispatcher: Option<Arc<SearchDispatcher>>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<dyn SiteRegistry>,
        sync: Option<Arc<SyncService>>,
        dispatcher: Option<Arc<SearchDispatcher>>,
    ) -> Self {
        Self {
            config,
            registry,
            sync,
            dispatcher,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn registry(&self) -> &dyn SiteRegistry {
        self.registry.as_ref()
    }

    pub fn sync(&self) -> Option<&Arc<SyncService>> {
        self.sync.as_ref()
    }

    pub fn dispatcher(&self) -> Option<&Arc<SearchDispatcher>> {
        self.dispatcher.as_ref()
    }
}
