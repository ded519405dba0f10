pub mod config;
pub mod dispatch;
pub mod indexer;
pub mod registry;
pub mod sync;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, BackendKind, Config, ConfigError,
    JackettConfig, ProwlarrConfig, SanitizedConfig,
};
pub use dispatch::SearchDispatcher;
pub use indexer::{
    BackendError, BackendIndexer, Category, CategoryMap, IndexerBackend, IndexerDescriptor,
    JackettBackend, MediaType, PrivacyTier, ProwlarrBackend, QueryKind, RawCategory, SearchSpec,
    TorrentResult,
};
pub use registry::{MemoryRegistry, RegistryError, SiteKey, SiteRegistry};
pub use sync::{SyncError, SyncReport, SyncService, SyncState};
