//! Torznab category bucketing.
//!
//! Category semantics come from the Torznab numbering convention: each
//! thousands block is a media family. The mapping is a table so the covered
//! blocks can change without touching the bucketing logic.

use super::types::{Category, CategoryMap, MediaType, RawCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Movie,
    Tv,
    Adult,
}

/// Inclusive category ranges and the bucket they land in.
const CATEGORY_TABLE: &[(u32, u32, Bucket)] = &[
    (2000, 2999, Bucket::Movie),
    (5000, 5999, Bucket::Tv),
    (6000, 6999, Bucket::Adult),
];

fn bucket_of(id: u32) -> Option<Bucket> {
    CATEGORY_TABLE
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&id))
        .map(|(_, _, bucket)| *bucket)
}

/// Bucket raw categories into a [`CategoryMap`] and decide whether the
/// indexer is adult-only.
///
/// Adult-only means the indexer reported at least one category and every one
/// of them is in the adult block. Adult categories never appear in the map
/// itself; codes outside all known blocks are ignored.
pub fn build_category_map(raw: &[RawCategory]) -> (CategoryMap, bool) {
    let mut map = CategoryMap::default();
    let mut adult = 0usize;

    for cat in raw {
        match bucket_of(cat.id) {
            Some(Bucket::Movie) => map.movie.push(Category {
                id: cat.id,
                name: cat.name.clone(),
            }),
            Some(Bucket::Tv) => map.tv.push(Category {
                id: cat.id,
                name: cat.name.clone(),
            }),
            Some(Bucket::Adult) => adult += 1,
            None => {}
        }
    }

    let adult_only = !raw.is_empty() && adult == raw.len();
    (map, adult_only)
}

/// Top-level category codes to request for a search.
pub fn search_categories(media: Option<MediaType>) -> &'static [u32] {
    match media {
        None => &[2000, 5000],
        Some(MediaType::Movie) => &[2000],
        Some(MediaType::Tv) => &[5000],
    }
}
