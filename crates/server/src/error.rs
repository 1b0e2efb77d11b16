//! Unified error handling for the HTTP surface.
//!
//! Every failure leaves the server as `{"error": "...", "details": "..."}`,
//! with `details` present only when the store sent something back.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::bigcommerce::BigCommerceError;
use crate::registry::RegistryError;
use crate::services::bulk_approval::BulkApprovalError;

/// Which upstream call failed, for client-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOperation {
    ListOrders,
    ApproveOrder,
}

impl UpstreamOperation {
    /// Message for a call the store answered with an error status.
    #[must_use]
    pub const fn rejected_message(self) -> &'static str {
        match self {
            Self::ListOrders => "Failed to fetch orders",
            Self::ApproveOrder => "Failed to approve order",
        }
    }

    /// Message for a call that never got a usable answer.
    #[must_use]
    pub const fn internal_message(self) -> &'static str {
        match self {
            Self::ListOrders => "Internal error fetching orders",
            Self::ApproveOrder => "Internal error approving order",
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// Referenced store is not registered.
    #[error("{0}")]
    NotFound(String),

    /// A BigCommerce call failed.
    #[error("{}: {source}", .operation.rejected_message())]
    Upstream {
        operation: UpstreamOperation,
        #[source]
        source: BigCommerceError,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a gateway failure from `operation`.
    #[must_use]
    pub const fn upstream(operation: UpstreamOperation, source: BigCommerceError) -> Self {
        Self::Upstream { operation, source }
    }

    /// HTTP status this error answers with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { source, .. } => source
                .status()
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(message) | Self::NotFound(message) => ErrorBody::new(message.clone()),
            Self::Upstream { operation, source } => match source {
                BigCommerceError::Upstream { body, .. } => {
                    let details = match operation {
                        UpstreamOperation::ApproveOrder => source.detail(),
                        UpstreamOperation::ListOrders => body.clone(),
                    };
                    ErrorBody::new(operation.rejected_message()).with_details(details)
                }
                // Don't expose transport details to clients
                _ => ErrorBody::new(operation.internal_message()),
            },
            Self::Internal(_) => ErrorBody::new("Internal server error"),
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Upstream {
                    source: BigCommerceError::Http(_)
                        | BigCommerceError::Parse(_)
                        | BigCommerceError::InvalidUrl(_),
                    ..
                }
        )
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request failed"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Invalid(e) => Self::Validation(e.to_string()),
            RegistryError::NotFound(_) => Self::NotFound("Store not found".to_owned()),
            RegistryError::Io { .. } | RegistryError::Corrupt { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<BulkApprovalError> for AppError {
    fn from(err: BulkApprovalError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
