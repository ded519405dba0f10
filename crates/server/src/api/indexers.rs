//! Registered indexer and sync status handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use indexrelay_core::{IndexerDescriptor, SyncReport};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IndexersResponse {
    pub indexers: Vec<IndexerDescriptor>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<SyncReport>,
}

/// GET /api/v1/indexers
///
/// List the currently registered sites.
pub async fn list_indexers(State(state): State<Arc<AppState>>) -> Json<IndexersResponse> {
    let indexers = state.registry().list();
    let count = indexers.len();
    Json(IndexersResponse { indexers, count })
}

/// GET /api/v1/sync/status
pub async fn sync_status(State(state): State<Arc<AppState>>) -> Json<SyncStatusResponse> {
    match state.sync() {
        Some(sync) => {
            let sync_state = sync.state_handle();
            let sync_state = sync_state.read().await;
            Json(SyncStatusResponse {
                running: sync.is_running(),
                last_run: sync_state.last_run,
                last_report: sync_state.last_report,
            })
        }
        None => Json(SyncStatusResponse {
            running: false,
            last_run: None,
            last_report: None,
        }),
    }
}

/// POST /api/v1/sync/run
///
/// Trigger a sync pass immediately.
pub async fn run_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncReport>, (StatusCode, Json<ErrorResponse>)> {
    let Some(sync) = state.sync() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Indexer backend not configured".to_string(),
            }),
        ));
    };

    match sync.run_pass().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
