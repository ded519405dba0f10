//! Indexer sync orchestration.

mod runner;
mod types;

pub use runner::SyncService;
pub use types::{SyncError, SyncReport, SyncState};
