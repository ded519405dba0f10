//! Field normalization shared by both backends.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Output format for publish dates.
const PUBDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalize a backend publish date to "YYYY-MM-DD HH:MM:SS" in UTC.
///
/// Jackett emits RFC 2822 (`Sat, 15 Jun 2024 10:30:00 +0000`), Prowlarr
/// emits RFC 3339; some indexers drop the timezone entirely.
pub fn normalize_pubdate(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
        .map(|dt| dt.format(PUBDATE_FORMAT).to_string())
}

/// Clamp a raw Torznab "peers" attribute (seeders + leechers) down to a
/// leecher count.
pub fn leechers_from_peers(peers: i64, seeders: i64) -> u32 {
    (peers - seeders).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rfc2822() {
        assert_eq!(
            normalize_pubdate("Sat, 15 Jun 2024 10:30:00 +0000"),
            Some("2024-06-15 10:30:00".to_string())
        );
    }

    #[test]
    fn test_normalize_rfc2822_with_offset() {
        assert_eq!(
            normalize_pubdate("Sat, 15 Jun 2024 10:30:00 +0200"),
            Some("2024-06-15 08:30:00".to_string())
        );
    }

    #[test]
    fn test_normalize_rfc3339() {
        assert_eq!(
            normalize_pubdate("2024-06-15T10:30:00Z"),
            Some("2024-06-15 10:30:00".to_string())
        );
        assert_eq!(
            normalize_pubdate("2024-06-15T10:30:00+02:00"),
            Some("2024-06-15 08:30:00".to_string())
        );
    }

    #[test]
    fn test_normalize_naive() {
        assert_eq!(
            normalize_pubdate("2024-06-15T10:30:00"),
            Some("2024-06-15 10:30:00".to_string())
        );
    }

    #[test]
    fn test_normalize_invalid() {
        assert_eq!(normalize_pubdate("yesterday"), None);
        assert_eq!(normalize_pubdate(""), None);
    }

    #[test]
    fn test_leechers_from_peers() {
        assert_eq!(leechers_from_peers(30, 10), 20);
        assert_eq!(leechers_from_peers(5, 10), 0);
        assert_eq!(leechers_from_peers(0, 0), 0);
    }
}
