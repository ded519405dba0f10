//! Indexer aggregation backends.
//!
//! This module provides an `IndexerBackend` trait for talking to indexer
//! aggregators (Jackett, Prowlarr) plus the classification pipeline that
//! turns their listings into registrable sites and their search responses
//! into normalized results.

pub mod categories;
mod jackett;
mod normalize;
mod prowlarr;
pub mod query;
mod torznab;
mod types;

pub use jackett::JackettBackend;
pub use normalize::normalize_pubdate;
pub use prowlarr::ProwlarrBackend;
pub use query::{is_english_like, normalize_imdb_id, QueryKind};
pub use types::*;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Timeout for listing and capability calls. Searches use the configured
/// backend timeout instead.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Map a non-success HTTP status to a backend error. Credential rejection and
/// rate limiting get dedicated error-level logs; the caller aborts either way.
pub(crate) fn api_status_error(backend: &str, status: StatusCode, body: &str) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => {
            error!(backend, "API key rejected, recheck the configured credential");
        }
        StatusCode::TOO_MANY_REQUESTS => {
            error!(backend, "Rate limited by the backend, reduce call frequency");
        }
        _ => {}
    }
    let detail: String = body.chars().take(200).collect();
    BackendError::ApiError(format!("HTTP {}: {}", status, detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_status_error_carries_status_and_body() {
        let err = api_status_error("jackett", StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, BackendError::ApiError(_)));
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
    }

    #[test]
    fn test_api_status_error_unauthorized() {
        let err = api_status_error("prowlarr", StatusCode::UNAUTHORIZED, "");
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_api_status_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = api_status_error("jackett", StatusCode::TOO_MANY_REQUESTS, &body);
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.len() < 300);
    }
}

/// An indexer aggregation backend.
#[async_trait]
pub trait IndexerBackend: Send + Sync {
    /// Short backend name, used in site keys and logs.
    fn name(&self) -> &str;

    /// List the configured, enabled indexers.
    async fn list_indexers(&self) -> Result<Vec<BackendIndexer>, BackendError>;

    /// Fetch the category capabilities of one indexer.
    async fn fetch_categories(
        &self,
        indexer: &BackendIndexer,
    ) -> Result<Vec<RawCategory>, BackendError>;

    /// Search one indexer.
    async fn search(
        &self,
        indexer: &IndexerDescriptor,
        spec: &SearchSpec,
    ) -> Result<Vec<TorrentResult>, BackendError>;
}
