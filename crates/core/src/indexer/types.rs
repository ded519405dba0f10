use serde::{Deserialize, Serialize};

use crate::registry::SiteKey;

use super::query::QueryKind;

/// Results per page requested from backends.
pub const RESULT_PAGE_SIZE: u32 = 100;

/// Privacy tier reported by the aggregation backend for an indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyTier {
    Public,
    SemiPrivate,
    Private,
}

impl PrivacyTier {
    /// Parse Prowlarr's `privacy` field. Unknown or missing values are
    /// treated as private so an odd upstream value never widens exposure.
    pub fn from_prowlarr(raw: &str) -> Self {
        match raw {
            "public" => Self::Public,
            "semiPrivate" => Self::SemiPrivate,
            _ => Self::Private,
        }
    }

    /// Parse Jackett's `type` field, same defaulting as Prowlarr.
    pub fn from_jackett(raw: &str) -> Self {
        match raw {
            "public" => Self::Public,
            "semi-public" => Self::SemiPrivate,
            _ => Self::Private,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Media type hint for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Tv,
}

/// An indexer as reported by the backend's listing endpoint, before
/// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendIndexer {
    /// Backend-scoped indexer id (Jackett slug or Prowlarr numeric id)
    pub id: String,
    /// Human-readable indexer name
    pub name: String,
    /// API URL for searching this indexer
    pub url: String,
    pub privacy: PrivacyTier,
}

/// A category as reported by the backend, before bucketing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCategory {
    pub id: u32,
    pub name: String,
}

/// A single category entry in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// Backend categories bucketed by media type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap {
    #[serde(default)]
    pub movie: Vec<Category>,
    #[serde(default)]
    pub tv: Vec<Category>,
}

impl CategoryMap {
    pub fn is_empty(&self) -> bool {
        self.movie.is_empty() && self.tv.is_empty()
    }
}

/// A registered indexer, ready to serve searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerDescriptor {
    pub key: SiteKey,
    /// Backend-scoped indexer id
    pub id: String,
    pub name: String,
    /// API URL for searching this indexer
    pub url: String,
    pub privacy: PrivacyTier,
    /// Whether outbound requests for this site go through the configured proxy
    pub use_proxy: bool,
    /// Empty when the backend's category listing was unavailable
    #[serde(default)]
    pub categories: CategoryMap,
}

/// A fully classified search request passed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub query: QueryKind,
    pub media: Option<MediaType>,
    /// Zero-based page; backends translate to their own offset scheme
    pub page: u32,
}

/// One normalized search result.
///
/// String fields that the backend did not supply are empty, numeric fields
/// default to zero and the promotion factors default to 1.0 (no discount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentResult {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Download link: a torrent file URL or a magnet URI
    pub enclosure: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub seeders: u32,
    /// Leecher count (not the raw Torznab "peers" attribute)
    #[serde(default)]
    pub peers: u32,
    #[serde(default)]
    pub grabs: u32,
    /// Normalized to "YYYY-MM-DD HH:MM:SS", empty when unparsable
    #[serde(default)]
    pub pubdate: String,
    /// "tt"-prefixed IMDb id, empty when absent
    #[serde(default)]
    pub imdbid: String,
    pub download_volume_factor: f64,
    pub upload_volume_factor: f64,
    pub site_name: String,
}

impl TorrentResult {
    /// A result with defaults filled in; parsers overwrite what the backend
    /// actually supplied.
    pub fn stub(title: String, enclosure: String, site_name: String) -> Self {
        Self {
            title,
            description: String::new(),
            enclosure,
            page_url: String::new(),
            size: 0,
            seeders: 0,
            peers: 0,
            grabs: 0,
            pubdate: String::new(),
            imdbid: String::new(),
            download_volume_factor: 1.0,
            upload_volume_factor: 1.0,
            site_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_from_prowlarr() {
        assert_eq!(PrivacyTier::from_prowlarr("public"), PrivacyTier::Public);
        assert_eq!(
            PrivacyTier::from_prowlarr("semiPrivate"),
            PrivacyTier::SemiPrivate
        );
        assert_eq!(PrivacyTier::from_prowlarr("private"), PrivacyTier::Private);
        // Unknown values default to private
        assert_eq!(PrivacyTier::from_prowlarr("weird"), PrivacyTier::Private);
        assert_eq!(PrivacyTier::from_prowlarr(""), PrivacyTier::Private);
    }

    #[test]
    fn test_privacy_from_jackett() {
        assert_eq!(PrivacyTier::from_jackett("public"), PrivacyTier::Public);
        assert_eq!(
            PrivacyTier::from_jackett("semi-public"),
            PrivacyTier::SemiPrivate
        );
        assert_eq!(PrivacyTier::from_jackett("private"), PrivacyTier::Private);
        assert_eq!(PrivacyTier::from_jackett(""), PrivacyTier::Private);
    }

    #[test]
    fn test_result_stub_defaults() {
        let r = TorrentResult::stub(
            "A Movie".to_string(),
            "magnet:?xt=x".to_string(),
            "site".to_string(),
        );
        assert_eq!(r.size, 0);
        assert_eq!(r.seeders, 0);
        assert_eq!(r.peers, 0);
        assert_eq!(r.download_volume_factor, 1.0);
        assert_eq!(r.upload_volume_factor, 1.0);
        assert!(r.pubdate.is_empty());
        assert!(r.imdbid.is_empty());
    }
}
