//! Common test utilities for E2E testing with mocks.
//!
//! Provides an in-process server wired to a mock backend and an in-memory
//! registry, so the HTTP surface can be exercised without a running Jackett
//! or Prowlarr.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use indexrelay_core::{
    config::{IndexerConfig, ServerConfig, SyncConfig},
    testing::MockBackend,
    BackendKind, Config, IndexerBackend, JackettConfig, MemoryRegistry, SearchDispatcher,
    SiteRegistry, SyncService,
};

/// Re-export fixtures for test convenience
pub use indexrelay_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock backend - configure indexers, categories and search results
    pub backend: Arc<MockBackend>,
    /// The site registry behind the server
    pub registry: Arc<MemoryRegistry>,
    /// The sync service; run passes manually with `sync.run_pass()`
    pub sync: Arc<SyncService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture. No sync pass has run yet.
    pub async fn new() -> Self {
        let backend = Arc::new(MockBackend::new());
        let registry = Arc::new(MemoryRegistry::new());

        let config = Config {
            server: ServerConfig::default(),
            indexer: Some(IndexerConfig {
                backend: BackendKind::Jackett,
                jackett: Some(JackettConfig {
                    url: "http://localhost:9117".to_string(),
                    api_key: "test-secret-key".to_string(),
                    timeout_secs: 60,
                    proxy_url: None,
                }),
                prowlarr: None,
                sync: SyncConfig::default(),
            }),
        };

        let sync = Arc::new(SyncService::new(
            Arc::clone(&backend) as Arc<dyn IndexerBackend>,
            Arc::clone(&registry) as Arc<dyn SiteRegistry>,
            Duration::from_secs(3600),
            false,
        ));

        let dispatcher = Arc::new(SearchDispatcher::new(
            Arc::clone(&backend) as Arc<dyn IndexerBackend>,
            sync.state_handle(),
        ));

        let state = Arc::new(indexrelay_server::state::AppState::new(
            config,
            Arc::clone(&registry) as Arc<dyn SiteRegistry>,
            Some(Arc::clone(&sync)),
            Some(dispatcher),
        ));

        let router = indexrelay_server::api::create_router(state);

        Self {
            router,
            backend,
            registry,
            sync,
        }
    }

    /// Create a fixture representing a server with no backend configured.
    pub async fn without_backend() -> Self {
        let fixture = Self::new().await;

        let config = Config {
            server: ServerConfig::default(),
            indexer: None,
        };

        let state = Arc::new(indexrelay_server::state::AppState::new(
            config,
            Arc::clone(&fixture.registry) as Arc<dyn SiteRegistry>,
            None,
            None,
        ));

        Self {
            router: indexrelay_server::api::create_router(state),
            ..fixture
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
