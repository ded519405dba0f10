use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, indexers, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Registered sites
        .route("/indexers", get(indexers::list_indexers))
        // Sync control
        .route("/sync/status", get(indexers::sync_status))
        .route("/sync/run", post(indexers::run_sync))
        // Search
        .route("/search", get(search::search))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
