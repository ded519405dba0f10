//! Search handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use indexrelay_core::{MediaType, SiteKey, TorrentResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// Restrict to one registered site; omit to search all of them
    #[serde(default)]
    pub site: Option<SiteKey>,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<TorrentResult>,
    pub count: usize,
}

/// GET /api/v1/search
///
/// Search registered sites. Unknown sites, rejected keywords and backend
/// failures all yield an empty result list rather than an error.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let Some(dispatcher) = state.dispatcher() else {
        return Json(SearchResponse {
            results: Vec::new(),
            count: 0,
        });
    };

    let results = match &params.site {
        Some(site) => {
            dispatcher
                .search(site, &params.keyword, params.media_type, params.page)
                .await
        }
        None => {
            dispatcher
                .search_all(&params.keyword, params.media_type, params.page)
                .await
        }
    };

    let count = results.len();
    Json(SearchResponse { results, count })
}
