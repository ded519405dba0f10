//! Testing utilities and mock implementations.
//!
//! This module provides a mock `IndexerBackend` plus fixture helpers so the
//! sync loop, dispatcher and HTTP surface can be tested end to end without
//! a running Jackett or Prowlarr.

mod mock_backend;

pub use mock_backend::{MockBackend, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::indexer::{BackendIndexer, PrivacyTier, RawCategory, TorrentResult};

    /// Create a private indexer listing entry with reasonable defaults.
    pub fn indexer(id: &str, privacy: PrivacyTier) -> BackendIndexer {
        BackendIndexer {
            id: id.to_string(),
            name: format!("{}-tracker", id),
            url: format!("http://mock/indexers/{}", id),
            privacy,
        }
    }

    /// Movie + TV categories, the common case.
    pub fn movie_tv_categories() -> Vec<RawCategory> {
        vec![
            RawCategory {
                id: 2000,
                name: "Movies".to_string(),
            },
            RawCategory {
                id: 2040,
                name: "Movies/HD".to_string(),
            },
            RawCategory {
                id: 5000,
                name: "TV".to_string(),
            },
        ]
    }

    /// Adult-only category set.
    pub fn adult_categories() -> Vec<RawCategory> {
        vec![
            RawCategory {
                id: 6000,
                name: "XXX".to_string(),
            },
            RawCategory {
                id: 6040,
                name: "XXX/HD".to_string(),
            },
        ]
    }

    /// Create a test search result with reasonable defaults.
    pub fn torrent_result(title: &str, site_name: &str) -> TorrentResult {
        TorrentResult {
            title: title.to_string(),
            description: String::new(),
            enclosure: format!("http://mock/dl/{}.torrent", title.replace(' ', "-")),
            page_url: String::new(),
            size: 1024 * 1024 * 1024, // 1 GiB
            seeders: 50,
            peers: 10,
            grabs: 5,
            pubdate: "2024-06-15 10:30:00".to_string(),
            imdbid: String::new(),
            download_volume_factor: 1.0,
            upload_volume_factor: 1.0,
            site_name: site_name.to_string(),
        }
    }

    /// Create a freeleech search result carrying an IMDb id.
    pub fn freeleech_result(title: &str, site_name: &str, imdbid: &str) -> TorrentResult {
        let mut result = torrent_result(title, site_name);
        result.imdbid = imdbid.to_string();
        result.download_volume_factor = 0.0;
        result
    }
}
