//! BigCommerce REST API integration.
//!
//! Thin gateway over the v2 orders endpoints. Every call is authenticated
//! with the store's API token and addressed by its store hash; the response
//! body is returned as raw JSON so callers see exactly what the store holds.
//!
//! # Example
//!
//! ```rust,ignore
//! use orderdesk_server::bigcommerce::{BigCommerceClient, OrderListQuery};
//!
//! let client = BigCommerceClient::new(&config.upstream)?;
//! let orders = client.list_orders(&conn, &OrderListQuery::default()).await?;
//! ```

mod client;

pub use client::{BigCommerceClient, OrderListQuery};

use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the store rejects an order update for lack of scope.
pub const PERMISSION_HINT: &str = "Permission denied: the API token for this store lacks the \
     \"Orders (Modify)\" scope. Create a token with that scope and reconnect the store.";

/// Errors that can occur when calling the BigCommerce API.
#[derive(Debug, Error)]
pub enum BigCommerceError {
    /// The API answered with a non-success status.
    #[error("BigCommerce returned {status}: {body}")]
    Upstream {
        /// Status code returned by the API.
        status: StatusCode,
        /// Response body text, as sent.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API base URL cannot carry a store path.
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl BigCommerceError {
    /// Whether a retry might succeed.
    ///
    /// Transport failures and throttling or gateway statuses are transient;
    /// everything else reflects the request itself.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Upstream { status, .. } => matches!(
                *status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            ),
            Self::Parse(_) | Self::InvalidUrl(_) => false,
        }
    }

    /// Whether the store refused the call for lack of token scope.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if *status == StatusCode::FORBIDDEN)
    }

    /// Upstream status, if the API answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable detail for a failed call.
    ///
    /// Upstream rejections yield the body text, prefixed by
    /// [`PERMISSION_HINT`] for a 403. Other failures yield their message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Upstream { status, body } if *status == StatusCode::FORBIDDEN => {
                format!("{PERMISSION_HINT} Details: {body}")
            }
            Self::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: StatusCode, body: &str) -> BigCommerceError {
        BigCommerceError::Upstream {
            status,
            body: body.to_owned(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(upstream(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(upstream(StatusCode::SERVICE_UNAVAILABLE, "").is_retryable());
        assert!(upstream(StatusCode::GATEWAY_TIMEOUT, "").is_retryable());
        assert!(!upstream(StatusCode::NOT_FOUND, "").is_retryable());
        assert!(!upstream(StatusCode::FORBIDDEN, "").is_retryable());
        assert!(!upstream(StatusCode::INTERNAL_SERVER_ERROR, "").is_retryable());
    }

    #[test]
    fn test_forbidden_detail_carries_hint_and_body() {
        let err = upstream(StatusCode::FORBIDDEN, r#"[{"status":403}]"#);
        assert!(err.is_permission_denied());
        let detail = err.detail();
        assert!(detail.starts_with(PERMISSION_HINT));
        assert!(detail.ends_with(r#"Details: [{"status":403}]"#));
    }

    #[test]
    fn test_other_detail_is_body() {
        let err = upstream(StatusCode::NOT_FOUND, "order gone");
        assert!(!err.is_permission_denied());
        assert_eq!(err.detail(), "order gone");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_invalid_url_detail() {
        let err = BigCommerceError::InvalidUrl("mailto:x".to_owned());
        assert_eq!(err.detail(), "Invalid API base URL: mailto:x");
        assert_eq!(err.status(), None);
    }
}
