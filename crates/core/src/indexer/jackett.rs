//! Jackett aggregation backend.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::JackettConfig;

use super::categories::search_categories;
use super::query::QueryKind;
use super::torznab;
use super::types::{
    BackendIndexer, IndexerDescriptor, RawCategory, SearchSpec, TorrentResult, RESULT_PAGE_SIZE,
};
use super::{BackendError, IndexerBackend, LISTING_TIMEOUT};

/// Jackett backend speaking the Torznab XML API.
pub struct JackettBackend {
    client: Client,
    config: JackettConfig,
}

impl JackettBackend {
    /// Create a new JackettBackend with the given configuration.
    pub fn new(config: JackettConfig) -> Self {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs as u64));

        if let Some(proxy_url) = &config.proxy_url {
            match reqwest::Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => {
                    tracing::warn!(proxy = %proxy_url, error = %e, "Ignoring invalid proxy URL")
                }
            }
        }

        let client = builder.build().expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Torznab API URL for a single indexer.
    fn indexer_api_url(&self, indexer_id: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/{}/results/torznab/api",
            self.base_url(),
            urlencoding::encode(indexer_id)
        )
    }

    fn build_search_url(&self, indexer: &IndexerDescriptor, spec: &SearchSpec) -> String {
        let mut url = format!(
            "{}?apikey={}",
            indexer.url,
            urlencoding::encode(&self.config.api_key)
        );

        match &spec.query {
            QueryKind::ImdbId(id) => {
                // Jackett's typed searches take the full tt-prefixed id
                let t = match spec.media {
                    Some(super::types::MediaType::Tv) => "tvsearch",
                    _ => "movie",
                };
                url.push_str(&format!("&t={}&imdbid={}", t, id));
            }
            QueryKind::Text(keyword) => {
                url.push_str(&format!("&t=search&q={}", urlencoding::encode(keyword)));
            }
        }

        let cats: Vec<String> = search_categories(spec.media)
            .iter()
            .map(|c| c.to_string())
            .collect();
        url.push_str(&format!("&cat={}", cats.join(",")));

        url.push_str(&format!(
            "&limit={}&offset={}",
            RESULT_PAGE_SIZE,
            spec.page * RESULT_PAGE_SIZE
        ));

        url
    }

    async fn fetch_text(&self, url: &str, timeout: Option<Duration>) -> Result<String, BackendError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else if e.is_connect() {
                BackendError::ConnectionFailed(e.to_string())
            } else {
                BackendError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(super::api_status_error("jackett", status, &body));
        }

        response
            .text()
            .await
            .map_err(|e| BackendError::ApiError(e.to_string()))
    }
}

#[async_trait]
impl IndexerBackend for JackettBackend {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn list_indexers(&self) -> Result<Vec<BackendIndexer>, BackendError> {
        let url = format!(
            "{}/api/v2.0/indexers/all/results/torznab/api?apikey={}&t=indexers&configured=true",
            self.base_url(),
            urlencoding::encode(&self.config.api_key)
        );
        debug!("Listing Jackett indexers");

        let body = self.fetch_text(&url, Some(LISTING_TIMEOUT)).await?;
        let entries = torznab::parse_indexers(&body)?;

        Ok(entries
            .into_iter()
            .filter(|e| e.configured)
            .map(|e| BackendIndexer {
                url: self.indexer_api_url(&e.id),
                id: e.id,
                name: e.title,
                privacy: e.privacy,
            })
            .collect())
    }

    async fn fetch_categories(
        &self,
        indexer: &BackendIndexer,
    ) -> Result<Vec<RawCategory>, BackendError> {
        let url = format!(
            "{}?apikey={}&t=caps",
            indexer.url,
            urlencoding::encode(&self.config.api_key)
        );
        debug!(indexer = %indexer.id, "Fetching Jackett caps");

        let body = self.fetch_text(&url, Some(LISTING_TIMEOUT)).await?;
        torznab::parse_caps(&body)
    }

    async fn search(
        &self,
        indexer: &IndexerDescriptor,
        spec: &SearchSpec,
    ) -> Result<Vec<TorrentResult>, BackendError> {
        let url = self.build_search_url(indexer, spec);
        debug!(indexer = %indexer.id, "Searching Jackett");

        let body = self.fetch_text(&url, None).await?;
        let (results, total) = torznab::parse_items(&body, &indexer.name)?;

        info!(
            indexer = %indexer.id,
            parsed = results.len(),
            total = total,
            "Jackett search complete"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::types::{CategoryMap, MediaType, PrivacyTier};
    use crate::registry::SiteKey;

    fn backend() -> JackettBackend {
        JackettBackend::new(JackettConfig {
            url: "http://localhost:9117/".to_string(), // trailing slash
            api_key: "test-key".to_string(),
            timeout_secs: 60,
            proxy_url: None,
        })
    }

    fn descriptor(id: &str) -> IndexerDescriptor {
        let backend = backend();
        IndexerDescriptor {
            key: SiteKey::derive("jackett", id),
            id: id.to_string(),
            name: id.to_string(),
            url: backend.indexer_api_url(id),
            privacy: PrivacyTier::Private,
            use_proxy: false,
            categories: CategoryMap::default(),
        }
    }

    #[test]
    fn test_indexer_api_url() {
        let url = backend().indexer_api_url("alpha");
        assert_eq!(
            url,
            "http://localhost:9117/api/v2.0/indexers/alpha/results/torznab/api"
        );
    }

    #[test]
    fn test_build_search_url_text() {
        let url = backend().build_search_url(
            &descriptor("alpha"),
            &SearchSpec {
                query: QueryKind::Text("the matrix".to_string()),
                media: None,
                page: 0,
            },
        );
        assert!(url.contains("apikey=test-key"));
        assert!(url.contains("t=search"));
        assert!(url.contains("q=the%20matrix"));
        assert!(url.contains("cat=2000,5000"));
        assert!(url.contains("limit=100"));
        assert!(url.contains("offset=0"));
    }

    #[test]
    fn test_build_search_url_imdb_movie() {
        let url = backend().build_search_url(
            &descriptor("alpha"),
            &SearchSpec {
                query: QueryKind::ImdbId("tt0133093".to_string()),
                media: Some(MediaType::Movie),
                page: 0,
            },
        );
        assert!(url.contains("t=movie"));
        assert!(url.contains("imdbid=tt0133093"));
        assert!(url.contains("cat=2000"));
        assert!(!url.contains("q="));
    }

    #[test]
    fn test_build_search_url_imdb_tv() {
        let url = backend().build_search_url(
            &descriptor("alpha"),
            &SearchSpec {
                query: QueryKind::ImdbId("tt0903747".to_string()),
                media: Some(MediaType::Tv),
                page: 0,
            },
        );
        assert!(url.contains("t=tvsearch"));
        assert!(url.contains("cat=5000"));
    }

    #[test]
    fn test_build_search_url_pagination() {
        let url = backend().build_search_url(
            &descriptor("alpha"),
            &SearchSpec {
                query: QueryKind::Text("x".to_string()),
                media: None,
                page: 3,
            },
        );
        assert!(url.contains("offset=300"));
    }
}
