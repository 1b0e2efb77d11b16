//! Integration tests for Order Desk.
//!
//! Each test builds the full router in-process and drives it with
//! `tower::ServiceExt::oneshot`. BigCommerce is replaced by an `httpmock`
//! server and the store registry lives in a temp directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orderdesk-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use httpmock::MockServer;
use orderdesk_server::{
    AppState, ServerConfig, app,
    bigcommerce::BigCommerceClient,
    config::RegistryConfig,
    registry::StoreRegistry,
    services::RetryPolicy,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

/// A running app wired to a mock BigCommerce and a temp registry file.
pub struct TestContext {
    pub upstream: MockServer,
    pub registry_path: PathBuf,
    router: Router,
    _dir: TempDir,
}

/// Status and parsed JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Fresh context with an empty registry.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let registry_path = dir.path().join("stores.json");
        let upstream = MockServer::start_async().await;
        let router = build_router(&upstream, &registry_path).await;

        Self {
            upstream,
            registry_path,
            router,
            _dir: dir,
        }
    }

    /// Rebuild the app from the registry file, as after a process restart.
    pub async fn restart(&mut self) {
        self.router = build_router(&self.upstream, &self.registry_path).await;
    }

    /// Send a request and parse the JSON response (`Null` for empty bodies).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str) -> TestResponse {
        self.request(Method::PUT, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Connect a store and return its id.
    pub async fn connect_store(&self, store_hash: &str, api_token: &str, name: Option<&str>) -> String {
        let mut body = json!({"storeHash": store_hash, "apiToken": api_token});
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        let response = self.post("/api/connect", body).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["storeId"].as_str().unwrap().to_owned()
    }
}

async fn build_router(upstream: &MockServer, registry_path: &std::path::Path) -> Router {
    let mut config = ServerConfig::from_lookup(|_| None).unwrap();
    config.registry = RegistryConfig::File(registry_path.to_path_buf());
    config.upstream.api_base = Url::parse(&upstream.base_url()).unwrap();

    let retry = RetryPolicy {
        max_attempts: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2,
    };
    let registry = StoreRegistry::open(&config.registry).await.unwrap();
    let client = BigCommerceClient::with_retry_policy(&config.upstream, retry).unwrap();

    app(AppState::from_parts(config, registry, client))
}
