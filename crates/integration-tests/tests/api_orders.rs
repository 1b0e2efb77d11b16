//! Order listing and approval endpoints, against a mock BigCommerce.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use httpmock::prelude::*;
use orderdesk_integration_tests::TestContext;
use serde_json::json;

async fn context_with_store() -> (TestContext, String) {
    let ctx = TestContext::new().await;
    let store_id = ctx.connect_store("abc123", "tok-1", Some("Main")).await;
    (ctx, store_id)
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn list_orders_proxies_upstream_body() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/stores/abc123/v2/orders")
                .header("x-auth-token", "tok-1");
            then.status(200)
                .json_body(json!([{"id": 100, "status": "Pending"}]));
        })
        .await;

    let response = ctx.get(&format!("/api/stores/{store_id}/orders")).await;

    mock.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([{"id": 100, "status": "Pending"}]));
}

#[tokio::test]
async fn list_orders_for_unknown_store_is_not_found() {
    let ctx = TestContext::new().await;
    let response = ctx.get("/api/stores/nope/orders").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "Unknown store"}));
}

#[tokio::test]
async fn list_orders_passes_upstream_status_through() {
    let (ctx, store_id) = context_with_store().await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(GET).path("/stores/abc123/v2/orders");
            then.status(401).body("invalid token");
        })
        .await;

    let response = ctx.get(&format!("/api/stores/{store_id}/orders")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body,
        json!({"error": "Failed to fetch orders", "details": "invalid token"})
    );
}

#[tokio::test]
async fn list_orders_forwards_filters() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(GET)
                .path("/stores/abc123/v2/orders")
                .query_param("status_id", "1")
                .query_param("limit", "50");
            then.status(204);
        })
        .await;

    let response = ctx
        .get(&format!("/api/stores/{store_id}/orders?status_id=1&limit=50"))
        .await;

    mock.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn list_orders_rejects_bad_query() {
    let (ctx, store_id) = context_with_store().await;
    let response = ctx
        .get(&format!("/api/stores/{store_id}/orders?page=first"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn list_orders_summary_view_normalises_records() {
    let (ctx, store_id) = context_with_store().await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(GET).path("/stores/abc123/v2/orders");
            then.status(200).json_body(json!([
                {
                    "id": 7,
                    "date_created": "Tue, 05 Mar 2024 10:00:00 +0000",
                    "status": "Awaiting Payment",
                    "total_inc_tax": "19.9900",
                    "payment_status": "pending",
                    "items_total": 2,
                    "billing_address": {
                        "first_name": "Ada",
                        "last_name": "Lovelace",
                        "email": "ada@example.com",
                        "phone": "555",
                        "city": "London",
                        "country": "United Kingdom"
                    }
                },
                {"id": 8, "status": "Pending"}
            ]));
        })
        .await;

    let response = ctx
        .get(&format!("/api/stores/{store_id}/orders?view=summary"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let summaries = response.body.as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["id"], 7);
    assert_eq!(summaries[0]["status"], "Awaiting Payment");
    assert_eq!(summaries[0]["customer"]["city"], "London");
}

// ============================================================================
// Single approval
// ============================================================================

#[tokio::test]
async fn approve_sets_completed_status() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/stores/abc123/v2/orders/42")
                .header("x-auth-token", "tok-1")
                .json_body(json!({"status_id": 11}));
            then.status(200).json_body(json!({"id": 42, "status_id": 11}));
        })
        .await;

    let response = ctx
        .put(&format!("/api/stores/{store_id}/orders/42/approve"))
        .await;

    mock.assert_async().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"success": true, "order": {"id": 42, "status_id": 11}})
    );
}

#[tokio::test]
async fn approve_forbidden_explains_missing_scope() {
    let (ctx, store_id) = context_with_store().await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/42");
            then.status(403).body(r#"[{"status":403,"message":"forbidden"}]"#);
        })
        .await;

    let response = ctx
        .put(&format!("/api/stores/{store_id}/orders/42/approve"))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "Failed to approve order");
    let details = response.body["details"].as_str().unwrap();
    assert!(details.contains("Orders (Modify)"));
    assert!(details.contains("reconnect"));
    assert!(details.ends_with(r#"[{"status":403,"message":"forbidden"}]"#));
}

#[tokio::test]
async fn approve_rejects_non_numeric_order_id() {
    let (ctx, store_id) = context_with_store().await;
    let response = ctx
        .put(&format!("/api/stores/{store_id}/orders/abc/approve"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_retries_transient_upstream_failures() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/1");
            then.status(503).body("maintenance");
        })
        .await;

    let response = ctx
        .put(&format!("/api/stores/{store_id}/orders/1/approve"))
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["details"], "maintenance");
    assert_eq!(mock.hits_async().await, 2);
}

// ============================================================================
// Bulk approval
// ============================================================================

#[tokio::test]
async fn approve_all_partitions_outcomes() {
    let (ctx, store_id) = context_with_store().await;
    for id in [1, 3] {
        ctx.upstream
            .mock_async(move |when, then| {
                when.method(PUT)
                    .path(format!("/stores/abc123/v2/orders/{id}"))
                    .json_body(json!({"status_id": 11}));
                then.status(200).json_body(json!({"id": id, "status_id": 11}));
            })
            .await;
    }
    ctx.upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/2");
            then.status(400).body("cannot transition");
        })
        .await;

    let response = ctx
        .post(
            &format!("/api/stores/{store_id}/orders/approve-all"),
            json!({"orderIds": [1, "2", 3]}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "success": [1, 3],
            "failed": [{"orderId": 2, "error": "cannot transition"}]
        })
    );
}

#[tokio::test]
async fn approve_all_with_empty_list_never_calls_upstream() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(PUT);
            then.status(200).json_body(json!({}));
        })
        .await;

    for body in [json!({"orderIds": []}), json!({"orderIds": null}), json!({})] {
        let response = ctx
            .post(&format!("/api/stores/{store_id}/orders/approve-all"), body)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "orderIds must be a non-empty array");
    }

    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn approve_all_unknown_store_is_not_found_before_validation() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post("/api/stores/nope/orders/approve-all", json!({"orderIds": []}))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approve_all_forbidden_items_carry_scope_hint() {
    let (ctx, store_id) = context_with_store().await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/5");
            then.status(403).body("no scope");
        })
        .await;

    let response = ctx
        .post(
            &format!("/api/stores/{store_id}/orders/approve-all"),
            json!({"orderIds": [5]}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!([]));
    let error = response.body["failed"][0]["error"].as_str().unwrap();
    assert!(error.contains("Orders (Modify)"));
    assert!(error.ends_with("no scope"));
}

#[tokio::test]
async fn approve_all_counts_bodiless_success_as_approved() {
    let (ctx, store_id) = context_with_store().await;
    let mock = ctx
        .upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/7");
            then.status(200);
        })
        .await;

    let response = ctx
        .post(
            &format!("/api/stores/{store_id}/orders/approve-all"),
            json!({"orderIds": [7]}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": [7], "failed": []}));
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn approve_all_repeated_gives_same_classification() {
    let (ctx, store_id) = context_with_store().await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/1");
            then.status(200).json_body(json!({"id": 1, "status_id": 11}));
        })
        .await;
    ctx.upstream
        .mock_async(|when, then| {
            when.method(PUT).path("/stores/abc123/v2/orders/2");
            then.status(404).body("no such order");
        })
        .await;

    let uri = format!("/api/stores/{store_id}/orders/approve-all");
    let first = ctx.post(&uri, json!({"orderIds": [1, 2]})).await;
    let second = ctx.post(&uri, json!({"orderIds": [1, 2]})).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body, second.body);
    assert_eq!(
        first.body,
        json!({"success": [1], "failed": [{"orderId": 2, "error": "no such order"}]})
    );
}
