pub mod handlers;
pub mod indexers;
pub mod routes;
pub mod search;

pub use routes::create_router;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
