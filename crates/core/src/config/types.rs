use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub indexer: Option<IndexerConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Indexer bridge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Indexer aggregation backend type
    pub backend: BackendKind,
    /// Jackett-specific configuration (required when backend = "jackett")
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
    /// Prowlarr-specific configuration (required when backend = "prowlarr")
    #[serde(default)]
    pub prowlarr: Option<ProwlarrConfig>,
    /// Background sync settings
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Available indexer aggregation backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Jackett,
    Prowlarr,
}

/// Jackett backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Search request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Optional HTTP proxy for outbound requests
    #[serde(default)]
    pub proxy_url: Option<String>,
}

/// Prowlarr backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProwlarrConfig {
    /// Prowlarr server URL (e.g., "http://localhost:9696")
    pub url: String,
    /// Prowlarr API key
    pub api_key: String,
    /// Search request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Optional HTTP proxy for outbound requests
    #[serde(default)]
    pub proxy_url: Option<String>,
}

fn default_timeout() -> u32 {
    60
}

/// Background sync settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Seconds between indexer sync passes (default: 1800)
    #[serde(default = "default_sync_interval")]
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sync_interval(),
        }
    }
}

fn default_sync_interval() -> u64 {
    1800
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexer: Option<SanitizedIndexerConfig>,
}

/// Sanitized indexer config (API keys redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackett: Option<SanitizedBackendConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prowlarr: Option<SanitizedBackendConfig>,
    pub sync_interval_secs: u64,
}

/// Sanitized backend config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub proxy_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            indexer: config.indexer.as_ref().map(|i| SanitizedIndexerConfig {
                backend: match i.backend {
                    BackendKind::Jackett => "jackett".to_string(),
                    BackendKind::Prowlarr => "prowlarr".to_string(),
                },
                jackett: i.jackett.as_ref().map(|j| SanitizedBackendConfig {
                    url: j.url.clone(),
                    api_key_configured: !j.api_key.is_empty(),
                    timeout_secs: j.timeout_secs,
                    proxy_configured: j.proxy_url.is_some(),
                }),
                prowlarr: i.prowlarr.as_ref().map(|p| SanitizedBackendConfig {
                    url: p.url.clone(),
                    api_key_configured: !p.api_key.is_empty(),
                    timeout_secs: p.timeout_secs,
                    proxy_configured: p.proxy_url.is_some(),
                }),
                sync_interval_secs: i.sync.interval_secs,
            }),
        }
    }
}
