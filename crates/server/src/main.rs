use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indexrelay_core::{
    load_config, validate_config, BackendKind, Config, IndexerBackend, JackettBackend,
    MemoryRegistry, ProwlarrBackend, SearchDispatcher, SiteRegistry, SyncService,
};

use indexrelay_server::api::create_router;
use indexrelay_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("INDEXRELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Log config hash so deployed configs can be told apart without
    // logging secrets
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );

    // Create backend if configured
    let backend: Option<Arc<dyn IndexerBackend>> = match &config.indexer {
        Some(indexer_config) => match indexer_config.backend {
            BackendKind::Jackett => {
                if let Some(jackett_config) = &indexer_config.jackett {
                    info!(url = %jackett_config.url, "Initializing Jackett backend");
                    Some(Arc::new(JackettBackend::new(jackett_config.clone())))
                } else {
                    error!("Jackett backend selected but no jackett config provided");
                    None
                }
            }
            BackendKind::Prowlarr => {
                if let Some(prowlarr_config) = &indexer_config.prowlarr {
                    info!(url = %prowlarr_config.url, "Initializing Prowlarr backend");
                    Some(Arc::new(ProwlarrBackend::new(prowlarr_config.clone())))
                } else {
                    error!("Prowlarr backend selected but no prowlarr config provided");
                    None
                }
            }
        },
        None => {
            info!("No indexer backend configured");
            None
        }
    };

    // Create site registry
    let registry: Arc<dyn SiteRegistry> = Arc::new(MemoryRegistry::new());

    // Create and start the sync service if we have a backend
    let (sync, dispatcher) = match &backend {
        Some(backend) => {
            let sync = Arc::new(SyncService::new(
                Arc::clone(backend),
                Arc::clone(&registry),
                Duration::from_secs(sync_interval_secs(&config)),
                proxy_configured(&config),
            ));
            sync.start().await;
            info!("Indexer sync service started");

            let dispatcher = Arc::new(SearchDispatcher::new(
                Arc::clone(backend),
                sync.state_handle(),
            ));

            (Some(sync), Some(dispatcher))
        }
        None => (None, None),
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        registry,
        sync.clone(),
        dispatcher,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the sync loop if running
    if let Some(ref sync) = sync {
        info!("Stopping sync service...");
        sync.stop().await;
    }

    info!("Server shut down");
    Ok(())
}

fn sync_interval_secs(config: &Config) -> u64 {
    config
        .indexer
        .as_ref()
        .map(|i| i.sync.interval_secs)
        .unwrap_or(1800)
}

fn proxy_configured(config: &Config) -> bool {
    config
        .indexer
        .as_ref()
        .map(|i| {
            i.jackett
                .as_ref()
                .map(|j| j.proxy_url.is_some())
                .or_else(|| i.prowlarr.as_ref().map(|p| p.proxy_url.is_some()))
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
