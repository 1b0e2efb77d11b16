//! Order handlers, proxied to BigCommerce.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use orderdesk_core::{ApprovalResult, OrderId, StoreConnection, StoreId, summarize_orders};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::{
    bigcommerce::OrderListQuery,
    error::{AppError, UpstreamOperation},
    registry::RegistryError,
    services::bulk_approval,
    state::AppState,
};

/// Query string of `GET /api/stores/{store_id}/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status_id: Option<u32>,
    /// `summary` returns normalised records instead of raw orders.
    pub view: Option<OrdersView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdersView {
    Raw,
    Summary,
}

impl ListOrdersParams {
    const fn upstream_query(&self) -> OrderListQuery {
        OrderListQuery {
            page: self.page,
            limit: self.limit,
            status_id: self.status_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub success: bool,
    pub order: Value,
}

/// Body of `POST /api/stores/{store_id}/orders/approve-all`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAllRequest {
    #[serde(default)]
    pub order_ids: Option<Vec<OrderId>>,
}

/// Resolve a path store id, reporting unknown ids as 404.
async fn resolve_store(state: &AppState, store_id: String) -> Result<StoreConnection, AppError> {
    state
        .registry()
        .get(&StoreId::new(store_id))
        .await
        .map_err(|e| match e {
            RegistryError::NotFound(_) => AppError::NotFound("Unknown store".to_owned()),
            other => other.into(),
        })
}

/// List a store's orders.
#[instrument(skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let conn = resolve_store(&state, store_id).await?;
    let Query(params) = params?;

    let orders = state
        .bigcommerce()
        .list_orders(&conn, &params.upstream_query())
        .await
        .map_err(|e| AppError::upstream(UpstreamOperation::ListOrders, e))?;

    if params.view != Some(OrdersView::Summary) {
        return Ok(Json(orders).into_response());
    }

    let records = orders.as_array().map_or(&[][..], Vec::as_slice);
    let (summaries, skipped) = summarize_orders(records);
    for (index, reason) in &skipped {
        tracing::warn!(index, error = %reason, "Skipping order without summary fields");
    }

    Ok(Json(summaries).into_response())
}

/// Approve one order.
#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    Path((store_id, order_id)): Path<(String, String)>,
) -> Result<Json<ApproveResponse>, AppError> {
    let conn = resolve_store(&state, store_id).await?;
    let order_id: OrderId = order_id
        .parse()
        .map_err(|e: orderdesk_core::InvalidOrderId| AppError::Validation(e.to_string()))?;

    let order = state
        .bigcommerce()
        .approve_order(&conn, order_id)
        .await
        .map_err(|e| AppError::upstream(UpstreamOperation::ApproveOrder, e))?;

    Ok(Json(ApproveResponse {
        success: true,
        order,
    }))
}

/// Approve many orders, reporting each outcome.
#[instrument(skip(state, body))]
pub async fn approve_all(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    body: Result<Json<ApproveAllRequest>, JsonRejection>,
) -> Result<Json<ApprovalResult>, AppError> {
    let conn = resolve_store(&state, store_id).await?;
    let Json(request) = body?;

    let result = bulk_approval::approve_all(
        state.bigcommerce(),
        &conn,
        request.order_ids.unwrap_or_default(),
        state.config().upstream.approval_concurrency,
    )
    .await?;

    Ok(Json(result))
}
