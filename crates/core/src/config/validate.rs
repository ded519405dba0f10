use super::{
    types::{BackendKind, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - The selected backend has a matching config section
/// - Backend URLs look like http(s) URLs and API keys are present
/// - Sync interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let Some(indexer) = &config.indexer else {
        return Ok(());
    };

    if indexer.sync.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "indexer.sync.interval_secs cannot be 0".to_string(),
        ));
    }

    let (section, url, api_key) = match indexer.backend {
        BackendKind::Jackett => {
            let Some(jackett) = &indexer.jackett else {
                return Err(ConfigError::ValidationError(
                    "indexer.backend = \"jackett\" requires an [indexer.jackett] section"
                        .to_string(),
                ));
            };
            ("indexer.jackett", &jackett.url, &jackett.api_key)
        }
        BackendKind::Prowlarr => {
            let Some(prowlarr) = &indexer.prowlarr else {
                return Err(ConfigError::ValidationError(
                    "indexer.backend = \"prowlarr\" requires an [indexer.prowlarr] section"
                        .to_string(),
                ));
            };
            ("indexer.prowlarr", &prowlarr.url, &prowlarr.api_key)
        }
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "{}.url must start with http:// or https://",
            section
        )));
    }

    if api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{}.api_key cannot be empty",
            section
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexerConfig, JackettConfig, ProwlarrConfig, ServerConfig, SyncConfig};
    use std::net::IpAddr;

    fn jackett_config(url: &str, api_key: &str) -> Config {
        Config {
            server: ServerConfig::default(),
            indexer: Some(IndexerConfig {
                backend: BackendKind::Jackett,
                jackett: Some(JackettConfig {
                    url: url.to_string(),
                    api_key: api_key.to_string(),
                    timeout_secs: 60,
                    proxy_url: None,
                }),
                prowlarr: None,
                sync: SyncConfig::default(),
            }),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = jackett_config("http://localhost:9117", "key");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_no_indexer_section_is_ok() {
        let config = Config {
            server: ServerConfig::default(),
            indexer: None,
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            indexer: None,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_backend_without_section_fails() {
        let config = Config {
            server: ServerConfig::default(),
            indexer: Some(IndexerConfig {
                backend: BackendKind::Prowlarr,
                jackett: None,
                prowlarr: None,
                sync: SyncConfig::default(),
            }),
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let config = jackett_config("localhost:9117", "key");
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let config = jackett_config("http://localhost:9117", "  ");
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_sync_interval_fails() {
        let config = Config {
            server: ServerConfig::default(),
            indexer: Some(IndexerConfig {
                backend: BackendKind::Prowlarr,
                jackett: None,
                prowlarr: Some(ProwlarrConfig {
                    url: "http://localhost:9696".to_string(),
                    api_key: "key".to_string(),
                    timeout_secs: 60,
                    proxy_url: None,
                }),
                sync: SyncConfig { interval_secs: 0 },
            }),
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
