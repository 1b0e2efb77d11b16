//! Store connection handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use orderdesk_core::{StoreId, StoreSummary};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

/// Body of `POST /api/connect`.
///
/// Fields are optional so that a missing field reports the same validation
/// error as a blank one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub store_hash: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("store_hash", &self.store_hash)
            .field("api_token", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    pub store_id: StoreId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Register a store and return its new id.
#[instrument(skip(state, body))]
pub async fn connect(
    State(state): State<AppState>,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, AppError> {
    let Json(request) = body?;

    let summary = state
        .registry()
        .connect(
            request.store_hash.as_deref().unwrap_or_default(),
            request.api_token.as_deref().unwrap_or_default(),
            request.name.as_deref(),
        )
        .await?;

    Ok(Json(ConnectResponse {
        success: true,
        store_id: summary.id,
        name: summary.name,
    }))
}

/// List registered stores without credentials.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<StoreSummary>> {
    Json(state.registry().list().await)
}

/// Remove a store.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.registry().remove(&StoreId::new(store_id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}
