//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing of the gateway
//! without a lending backend, identity pool or bucket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use loanport_core::{
    config::{Config, DeploymentMode, EnvironmentConfig, Environments, ServerConfig, UploadConfig},
    ingest::{DocumentSubmitter, IngestionService, UploadOrchestrator},
    testing::{MockBackend, MockCredentialBroker, MockObjectStore},
};
use loanport_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use loanport_core::testing::fixtures;

const BOUNDARY: &str = "loanport-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The lending backend (MockBackend)
/// - The identity provider (MockCredentialBroker)
/// - The object store (MockObjectStore)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_progress() {
///     let fixture = TestFixture::new();
///     fixture.backend.set_profile("b-1", fixtures::new_profile()).await;
///
///     let response = fixture.get("/api/v1/borrowers/b-1/progress").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock backend - configure profiles and failures
    pub backend: MockBackend,
    /// Mock credential broker - count exchanges
    pub broker: MockCredentialBroker,
    /// Mock object store - inspect and fail uploads
    pub store: MockObjectStore,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// One part of a multipart test form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn test_config() -> Config {
    Config {
        mode: DeploymentMode::Development,
        server: ServerConfig {
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0, // Not used for in-process testing
        },
        environments: Environments {
            development: Some(EnvironmentConfig {
                base_url: "https://dev-api.example.com".to_string(),
                storage_region: "ap-south-1".to_string(),
                storage_bucket: "dev-borrower-docs".to_string(),
                identity_pool_id: "ap-south-1:00000000-0000-0000-0000-000000000000".to_string(),
                storage_endpoint: None,
                timeout_secs: 5,
            }),
            staging: None,
            production: None,
        },
        uploads: UploadConfig {
            max_file_bytes: 64 * 1024,
            credential_refresh_skew_secs: 60,
        },
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        let config = test_config();
        let backend = MockBackend::new();
        let broker = MockCredentialBroker::new();
        let store = MockObjectStore::new();

        let ingestion = IngestionService::new(
            UploadOrchestrator::new(
                Arc::new(broker.clone()),
                Arc::new(store.clone()),
                config.uploads.max_file_bytes,
            ),
            DocumentSubmitter::new(Arc::new(backend.clone())),
        );

        let state = Arc::new(AppState::new(config, Arc::new(backend.clone()), ingestion));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            backend,
            broker,
            store,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a POST request with a multipart form body.
    pub async fn post_multipart(&self, path: &str, parts: &[Part<'_>]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A small PDF-looking file part.
pub fn pdf<'a>(file_name: &'a str) -> Part<'a> {
    Part::File {
        file_name,
        content_type: "application/pdf",
        bytes: b"%PDF-1.4 test document",
    }
}
