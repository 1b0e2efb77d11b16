//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                          - Liveness text
//! GET    /health                                    - Health check
//!
//! # Stores
//! POST   /api/connect                               - Register a store
//! GET    /api/stores                                - List stores
//! DELETE /api/stores/{store_id}                     - Remove a store
//!
//! # Orders (proxied to BigCommerce)
//! GET    /api/stores/{store_id}/orders              - List orders
//! PUT    /api/stores/{store_id}/orders/{order_id}/approve - Approve one order
//! POST   /api/stores/{store_id}/orders/approve-all  - Approve many orders
//! ```

use std::any::Any;

use axum::{
    Router,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{cors_layer, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

pub mod health;
pub mod orders;
pub mod stores;

/// Build the route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Stores
        .route("/api/connect", post(stores::connect))
        .route("/api/stores", get(stores::list))
        .route("/api/stores/{store_id}", delete(stores::remove))
        // Orders
        .route("/api/stores/{store_id}/orders", get(orders::list))
        .route(
            "/api/stores/{store_id}/orders/{order_id}/approve",
            put(orders::approve),
        )
        .route(
            "/api/stores/{store_id}/orders/approve-all",
            post(orders::approve_all),
        )
}

/// Build the full application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    routes()
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Turn a handler panic into a 500 JSON response.
#[allow(clippy::needless_pass_by_value)]
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(format!("handler panicked: {message}")).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::bigcommerce::BigCommerceClient;
    use crate::config::ServerConfig;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::registry::StoreRegistry;

    fn test_app(vars: &'static [(&'static str, &'static str)]) -> Router {
        let config = ServerConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        })
        .unwrap();
        let client = BigCommerceClient::new(&config.upstream).unwrap();
        app(AppState::from_parts(config, StoreRegistry::in_memory(), client))
    }

    #[tokio::test]
    async fn test_root_banner() {
        let response = test_app(&[])
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Backend API running");
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let response = test_app(&[])
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[REQUEST_ID_HEADER], "req-123");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(
            headers[header::CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .contains("connect-src 'self' https://api.bigcommerce.com")
        );
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = test_app(&[])
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_cors_preflight_uses_configured_origin() {
        let response = test_app(&[("CORS_ORIGIN", "https://ops.example.com")])
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/stores")
                    .header(header::ORIGIN, "https://ops.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://ops.example.com"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_app(&[])
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_panic_becomes_json_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
