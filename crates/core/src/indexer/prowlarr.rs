//! Prowlarr aggregation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ProwlarrConfig;

use super::categories::search_categories;
use super::normalize::normalize_pubdate;
use super::query::{normalize_imdb_id, QueryKind};
use super::types::{
    BackendIndexer, IndexerDescriptor, PrivacyTier, RawCategory, SearchSpec, TorrentResult,
    RESULT_PAGE_SIZE,
};
use super::{BackendError, IndexerBackend, LISTING_TIMEOUT};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Prowlarr backend speaking the v1 JSON API.
pub struct ProwlarrBackend {
    client: Client,
    config: ProwlarrConfig,
}

impl ProwlarrBackend {
    /// Create a new ProwlarrBackend with the given configuration.
    pub fn new(config: ProwlarrConfig) -> Self {
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

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Option<Duration>,
    ) -> Result<T, BackendError> {
        let mut request = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(query);
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
            return Err(super::api_status_error("prowlarr", status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl IndexerBackend for ProwlarrBackend {
    fn name(&self) -> &str {
        "prowlarr"
    }

    async fn list_indexers(&self) -> Result<Vec<BackendIndexer>, BackendError> {
        let url = format!("{}/api/v1/indexer", self.base_url());
        debug!("Listing Prowlarr indexers");

        let indexers: Vec<ProwlarrIndexer> =
            self.fetch_json(&url, &[], Some(LISTING_TIMEOUT)).await?;

        Ok(indexers
            .into_iter()
            .filter(|i| i.enable)
            .map(|i| BackendIndexer {
                id: i.id.to_string(),
                name: i.name,
                url: format!("{}/api/v1/indexer/{}", self.base_url(), i.id),
                privacy: PrivacyTier::from_prowlarr(i.privacy.as_deref().unwrap_or_default()),
            })
            .collect())
    }

    async fn fetch_categories(
        &self,
        indexer: &BackendIndexer,
    ) -> Result<Vec<RawCategory>, BackendError> {
        debug!(indexer = %indexer.id, "Fetching Prowlarr capabilities");

        let detail: ProwlarrIndexerDetail = self
            .fetch_json(&indexer.url, &[], Some(LISTING_TIMEOUT))
            .await?;

        let mut categories = Vec::new();
        for cat in detail.capabilities.categories {
            flatten_category(&cat, &mut categories);
        }
        Ok(categories)
    }

    async fn search(
        &self,
        indexer: &IndexerDescriptor,
        spec: &SearchSpec,
    ) -> Result<Vec<TorrentResult>, BackendError> {
        let url = format!("{}/api/v1/search", self.base_url());
        let params = build_search_params(indexer, spec);

        debug!(indexer = %indexer.id, "Searching Prowlarr");

        let raw: Vec<ProwlarrRelease> = self.fetch_json(&url, &params, None).await?;
        let total = raw.len();

        let results: Vec<TorrentResult> = raw
            .into_iter()
            .filter_map(|r| {
                let result = r.into_result(&indexer.name);
                if result.is_none() {
                    warn!(indexer = %indexer.id, "Skipping release without title or download link");
                }
                result
            })
            .collect();

        info!(
            indexer = %indexer.id,
            parsed = results.len(),
            total = total,
            "Prowlarr search complete"
        );

        Ok(results)
    }
}

fn build_search_params(indexer: &IndexerDescriptor, spec: &SearchSpec) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    match &spec.query {
        // Prowlarr's dedicated imdbId parameter takes the bare numeric id
        QueryKind::ImdbId(_) => {
            let digits = spec.query.imdb_digits().unwrap_or_default();
            params.push(("imdbId".to_string(), digits.to_string()));
        }
        QueryKind::Text(keyword) => params.push(("query".to_string(), keyword.clone())),
    }
    params.push(("indexerIds".to_string(), indexer.id.clone()));
    for cat in search_categories(spec.media) {
        params.push(("categories".to_string(), cat.to_string()));
    }
    params.push(("type".to_string(), "search".to_string()));
    params.push(("limit".to_string(), RESULT_PAGE_SIZE.to_string()));
    params.push((
        "offset".to_string(),
        (spec.page * RESULT_PAGE_SIZE).to_string(),
    ));
    params
}

fn flatten_category(cat: &ProwlarrCategory, out: &mut Vec<RawCategory>) {
    out.push(RawCategory {
        id: cat.id,
        name: cat.name.clone().unwrap_or_default(),
    });
    for sub in &cat.sub_categories {
        flatten_category(sub, out);
    }
}

/// Promotion factors carried by Prowlarr's `indexerFlags` field.
///
/// Newer versions emit a string array ("freeleech", "halfleech",
/// "doubleUpload"); older versions emit a bitmask where bit 0 is freeleech.
fn volume_factors(flags: Option<&Value>) -> (f64, f64) {
    let mut download = 1.0;
    let mut upload = 1.0;

    match flags {
        Some(Value::Array(items)) => {
            for item in items {
                let Some(flag) = item.as_str() else { continue };
                match flag.to_lowercase().as_str() {
                    "freeleech" => download = 0.0,
                    "halfleech" => download = 0.5,
                    "doubleupload" => upload = 2.0,
                    _ => {}
                }
            }
        }
        Some(Value::Number(n)) => {
            if n.as_u64().is_some_and(|bits| bits & 1 == 1) {
                download = 0.0;
            }
        }
        _ => {}
    }

    (download, upload)
}

/// Extract an IMDb id from Prowlarr's `imdbId`, which may be a number or a
/// string depending on version.
fn imdb_from_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|n| *n > 0)
            .map(|n| format!("tt{}", n))
            .unwrap_or_default(),
        Some(Value::String(s)) => normalize_imdb_id(s).unwrap_or_default(),
        _ => String::new(),
    }
}

// Prowlarr API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrIndexer {
    id: i64,
    name: String,
    #[serde(default)]
    enable: bool,
    #[serde(default)]
    privacy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrIndexerDetail {
    #[serde(default)]
    capabilities: ProwlarrCapabilities,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrCapabilities {
    #[serde(default)]
    categories: Vec<ProwlarrCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrCategory {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sub_categories: Vec<ProwlarrCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrRelease {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    magnet_url: Option<String>,
    #[serde(default)]
    info_url: Option<String>,
    #[serde(default)]
    guid: Option<String>,
    #[serde(default)]
    size: Option<i64>,
    #[serde(default)]
    seeders: Option<i64>,
    #[serde(default)]
    leechers: Option<i64>,
    #[serde(default)]
    grabs: Option<i64>,
    #[serde(default)]
    publish_date: Option<String>,
    #[serde(default)]
    imdb_id: Option<Value>,
    #[serde(default)]
    indexer_flags: Option<Value>,
}

impl ProwlarrRelease {
    fn into_result(self, site_name: &str) -> Option<TorrentResult> {
        let title = self.title?;
        let enclosure = self.download_url.or(self.magnet_url)?;

        let (download_volume_factor, upload_volume_factor) =
            volume_factors(self.indexer_flags.as_ref());

        Some(TorrentResult {
            title,
            description: String::new(),
            enclosure,
            page_url: self.info_url.or(self.guid).unwrap_or_default(),
            size: self.size.unwrap_or(0).max(0) as u64,
            seeders: self.seeders.unwrap_or(0).max(0) as u32,
            peers: self.leechers.unwrap_or(0).max(0) as u32,
            grabs: self.grabs.unwrap_or(0).max(0) as u32,
            pubdate: self
                .publish_date
                .as_deref()
                .and_then(normalize_pubdate)
                .unwrap_or_default(),
            imdbid: imdb_from_value(self.imdb_id.as_ref()),
            download_volume_factor,
            upload_volume_factor,
            site_name: site_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::types::{CategoryMap, MediaType};
    use crate::registry::SiteKey;
    use serde_json::json;

    fn descriptor(id: &str) -> IndexerDescriptor {
        IndexerDescriptor {
            key: SiteKey::derive("prowlarr", id),
            id: id.to_string(),
            name: format!("indexer-{}", id),
            url: format!("http://localhost:9696/api/v1/indexer/{}", id),
            privacy: PrivacyTier::Private,
            use_proxy: false,
            categories: CategoryMap::default(),
        }
    }

    #[test]
    fn test_search_params_imdb_uses_dedicated_parameter() {
        let params = build_search_params(
            &descriptor("1"),
            &SearchSpec {
                query: QueryKind::ImdbId("tt0133093".to_string()),
                media: Some(MediaType::Movie),
                page: 0,
            },
        );
        assert!(params.contains(&("imdbId".to_string(), "0133093".to_string())));
        assert!(params.iter().all(|(k, _)| k != "query"));
        assert!(params.contains(&("categories".to_string(), "2000".to_string())));
        assert!(params.contains(&("limit".to_string(), "100".to_string())));
    }

    #[test]
    fn test_search_params_text_query() {
        let params = build_search_params(
            &descriptor("1"),
            &SearchSpec {
                query: QueryKind::Text("the matrix".to_string()),
                media: None,
                page: 2,
            },
        );
        assert!(params.contains(&("query".to_string(), "the matrix".to_string())));
        assert!(params.iter().all(|(k, _)| k != "imdbId"));
        assert!(params.contains(&("indexerIds".to_string(), "1".to_string())));
        assert!(params.contains(&("offset".to_string(), "200".to_string())));
    }

    #[test]
    fn test_volume_factors_string_array() {
        let flags = json!(["freeleech"]);
        assert_eq!(volume_factors(Some(&flags)), (0.0, 1.0));

        let flags = json!(["halfLeech", "doubleUpload"]);
        assert_eq!(volume_factors(Some(&flags)), (0.5, 2.0));
    }

    #[test]
    fn test_volume_factors_bitmask() {
        let flags = json!(1);
        assert_eq!(volume_factors(Some(&flags)), (0.0, 1.0));

        let flags = json!(2);
        assert_eq!(volume_factors(Some(&flags)), (1.0, 1.0));
    }

    #[test]
    fn test_volume_factors_absent() {
        assert_eq!(volume_factors(None), (1.0, 1.0));
        let flags = json!(null);
        assert_eq!(volume_factors(Some(&flags)), (1.0, 1.0));
    }

    #[test]
    fn test_imdb_from_value() {
        assert_eq!(imdb_from_value(Some(&json!(133093))), "tt133093");
        assert_eq!(imdb_from_value(Some(&json!("tt0133093"))), "tt0133093");
        assert_eq!(imdb_from_value(Some(&json!("0133093"))), "tt0133093");
        assert_eq!(imdb_from_value(Some(&json!(0))), "");
        assert_eq!(imdb_from_value(None), "");
    }

    #[test]
    fn test_release_into_result() {
        let release: ProwlarrRelease = serde_json::from_value(json!({
            "title": "The Matrix 1999 2160p",
            "downloadUrl": "http://prowlarr/dl/1",
            "infoUrl": "http://tracker/details/1",
            "size": 4294967296u64,
            "seeders": 50,
            "leechers": 5,
            "grabs": 123,
            "publishDate": "2024-06-15T10:30:00Z",
            "imdbId": 133093,
            "indexerFlags": ["freeleech"]
        }))
        .unwrap();

        let result = release.into_result("alpha").unwrap();
        assert_eq!(result.title, "The Matrix 1999 2160p");
        assert_eq!(result.enclosure, "http://prowlarr/dl/1");
        assert_eq!(result.page_url, "http://tracker/details/1");
        assert_eq!(result.size, 4294967296);
        assert_eq!(result.seeders, 50);
        assert_eq!(result.peers, 5);
        assert_eq!(result.grabs, 123);
        assert_eq!(result.pubdate, "2024-06-15 10:30:00");
        assert_eq!(result.imdbid, "tt133093");
        assert_eq!(result.download_volume_factor, 0.0);
        assert_eq!(result.site_name, "alpha");
    }

    #[test]
    fn test_release_without_download_link_skipped() {
        let release: ProwlarrRelease =
            serde_json::from_value(json!({ "title": "No Link" })).unwrap();
        assert!(release.into_result("alpha").is_none());
    }

    #[test]
    fn test_release_magnet_fallback() {
        let release: ProwlarrRelease = serde_json::from_value(json!({
            "title": "Magnet Only",
            "magnetUrl": "magnet:?xt=urn:btih:abc"
        }))
        .unwrap();
        let result = release.into_result("alpha").unwrap();
        assert_eq!(result.enclosure, "magnet:?xt=urn:btih:abc");
        assert_eq!(result.download_volume_factor, 1.0);
    }

    #[test]
    fn test_flatten_categories() {
        let cat: ProwlarrCategory = serde_json::from_value(json!({
            "id": 2000,
            "name": "Movies",
            "subCategories": [
                { "id": 2040, "name": "Movies/HD" },
                { "id": 2045, "name": "Movies/UHD" }
            ]
        }))
        .unwrap();

        let mut out = Vec::new();
        flatten_category(&cat, &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].id, 2000);
        assert_eq!(out[1].id, 2040);
        assert_eq!(out[2].name, "Movies/UHD");
    }

    #[test]
    fn test_indexer_listing_deserialization() {
        let indexers: Vec<ProwlarrIndexer> = serde_json::from_value(json!([
            { "id": 1, "name": "Alpha", "enable": true, "privacy": "private" },
            { "id": 2, "name": "Beta", "enable": false, "privacy": "public" }
        ]))
        .unwrap();

        assert_eq!(indexers.len(), 2);
        assert!(indexers[0].enable);
        assert_eq!(indexers[1].privacy.as_deref(), Some("public"));
    }
}
