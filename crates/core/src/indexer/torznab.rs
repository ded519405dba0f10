//! Torznab XML parsing.
//!
//! Jackett speaks Torznab, an RSS dialect where torrent metadata rides in
//! `<torznab:attr name="..." value="..."/>` elements. The parsers here are
//! event-driven so a single malformed item degrades to a skip instead of
//! failing the whole response.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use super::normalize::{leechers_from_peers, normalize_pubdate};
use super::query::normalize_imdb_id;
use super::types::{PrivacyTier, RawCategory, TorrentResult};
use super::BackendError;

/// One entry from a `t=indexers` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorznabIndexerEntry {
    pub id: String,
    pub title: String,
    pub privacy: PrivacyTier,
    pub configured: bool,
}

/// Parse a `t=indexers` response into indexer entries.
pub fn parse_indexers(xml: &str) -> Result<Vec<TorznabIndexerEntry>, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<TorznabIndexerEntry> = None;
    let mut current_tag = String::new();
    let mut depth_in_indexer = 0u32;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if tag_name == "indexer" {
                    let mut entry = TorznabIndexerEntry {
                        id: String::new(),
                        title: String::new(),
                        privacy: PrivacyTier::Private,
                        configured: false,
                    };
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                        let val = String::from_utf8_lossy(&attr.value).to_string();
                        match key.as_str() {
                            "id" => entry.id = val,
                            "configured" => entry.configured = val == "true",
                            _ => {}
                        }
                    }
                    current = Some(entry);
                    depth_in_indexer = 0;
                } else if current.is_some() {
                    depth_in_indexer += 1;
                    // Only direct children carry the fields we want; <caps>
                    // nests its own <title> elements
                    if depth_in_indexer == 1 {
                        current_tag = tag_name;
                    } else {
                        current_tag.clear();
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut entry) = current {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match current_tag.as_str() {
                        "title" => entry.title = text,
                        "type" => entry.privacy = PrivacyTier::from_jackett(&text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag_name == "indexer" {
                    if let Some(entry) = current.take() {
                        if entry.id.is_empty() {
                            warn!("Skipping indexer entry without id");
                        } else {
                            entries.push(entry);
                        }
                    }
                } else if current.is_some() {
                    depth_in_indexer = depth_in_indexer.saturating_sub(1);
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::ParseError(format!("indexers XML: {}", e))),
            _ => {}
        }
    }

    Ok(entries)
}

/// Parse a `t=caps` response into raw categories (subcategories included).
pub fn parse_caps(xml: &str) -> Result<Vec<RawCategory>, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut categories = Vec::new();

    loop {
        let event = reader.read_event();
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag_name == "category" || tag_name == "subcat" {
                    let mut id: Option<u32> = None;
                    let mut name = String::new();
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                        let val = String::from_utf8_lossy(&attr.value).to_string();
                        match key.as_str() {
                            "id" => id = val.parse().ok(),
                            "name" => name = val,
                            _ => {}
                        }
                    }
                    if let Some(id) = id {
                        categories.push(RawCategory { id, name });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::ParseError(format!("caps XML: {}", e))),
            _ => {}
        }
    }

    Ok(categories)
}

/// Parse a search response into normalized results.
///
/// Returns the results together with the number of `<item>` elements seen,
/// so the caller can log how many were skipped.
pub fn parse_items(xml: &str, site_name: &str) -> Result<(Vec<TorrentResult>, usize), BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut total = 0usize;
    let mut current: Option<ItemBuilder> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if tag_name == "item" {
                    current = Some(ItemBuilder::default());
                    current_tag.clear();
                } else if let Some(ref mut item) = current {
                    match tag_name.as_str() {
                        "torznab:attr" => {
                            let mut attr_name = String::new();
                            let mut attr_value = String::new();
                            for attr in e.attributes().flatten() {
                                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                                let val = String::from_utf8_lossy(&attr.value).to_string();
                                if key == "name" {
                                    attr_name = val;
                                } else if key == "value" {
                                    attr_value = val;
                                }
                            }
                            item.set_torznab_attr(&attr_name, &attr_value);
                        }
                        "enclosure" => {
                            for attr in e.attributes().flatten() {
                                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                                let val = String::from_utf8_lossy(&attr.value).to_string();
                                match key.as_str() {
                                    "url" => item.enclosure = Some(val),
                                    "length" => {
                                        if item.size.is_none() {
                                            item.size = val.parse().ok();
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                        _ => current_tag = tag_name,
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut item) = current {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        match current_tag.as_str() {
                            "title" => item.title = Some(text),
                            "description" => item.description = Some(text),
                            "link" => item.link = Some(text),
                            "guid" => item.guid = Some(text),
                            "comments" => item.comments = Some(text),
                            "pubDate" => item.pubdate = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag_name == "item" {
                    total += 1;
                    if let Some(item) = current.take() {
                        match item.build(site_name) {
                            Some(result) => results.push(result),
                            None => warn!(site = site_name, "Skipping item without title or download link"),
                        }
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::ParseError(format!("results XML: {}", e))),
            _ => {}
        }
    }

    Ok((results, total))
}

/// Accumulates one `<item>` while the event loop walks it.
#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    comments: Option<String>,
    enclosure: Option<String>,
    magnet: Option<String>,
    pubdate: Option<String>,
    size: Option<u64>,
    seeders: Option<i64>,
    peers: Option<i64>,
    grabs: Option<u32>,
    imdbid: Option<String>,
    download_volume_factor: Option<f64>,
    upload_volume_factor: Option<f64>,
}

impl ItemBuilder {
    fn set_torznab_attr(&mut self, name: &str, value: &str) {
        match name {
            "size" => self.size = value.parse().ok(),
            "seeders" => self.seeders = value.parse().ok(),
            "peers" => self.peers = value.parse().ok(),
            "grabs" => self.grabs = value.parse().ok(),
            "imdb" | "imdbid" => self.imdbid = normalize_imdb_id(value),
            "magneturl" => self.magnet = Some(value.to_string()),
            "downloadvolumefactor" => self.download_volume_factor = value.parse().ok(),
            "uploadvolumefactor" => self.upload_volume_factor = value.parse().ok(),
            _ => {}
        }
    }

    fn build(self, site_name: &str) -> Option<TorrentResult> {
        let title = self.title?;
        // Prefer the enclosure URL, fall back to a magnet attr, then <link>
        let enclosure = self.enclosure.or(self.magnet).or(self.link)?;

        let seeders = self.seeders.unwrap_or(0).max(0);
        let peers = self.peers.unwrap_or(0).max(0);

        let pubdate = self
            .pubdate
            .as_deref()
            .and_then(|raw| {
                let normalized = normalize_pubdate(raw);
                if normalized.is_none() {
                    warn!(site = site_name, pubdate = raw, "Unparsable publish date");
                }
                normalized
            })
            .unwrap_or_default();

        Some(TorrentResult {
            title,
            description: self.description.unwrap_or_default(),
            enclosure,
            page_url: self.comments.or(self.guid).unwrap_or_default(),
            size: self.size.unwrap_or(0),
            seeders: seeders as u32,
            peers: leechers_from_peers(peers, seeders),
            grabs: self.grabs.unwrap_or(0),
            pubdate,
            imdbid: self.imdbid.unwrap_or_default(),
            download_volume_factor: self.download_volume_factor.unwrap_or(1.0),
            upload_volume_factor: self.upload_volume_factor.unwrap_or(1.0),
            site_name: site_name.to_string(),
        })
    }
}
