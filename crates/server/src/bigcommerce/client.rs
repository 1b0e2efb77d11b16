//! BigCommerce v2 orders client.

use std::sync::Arc;

use orderdesk_core::{OrderId, StatusUpdate, StoreConnection};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::BigCommerceError;
use crate::config::UpstreamConfig;
use crate::services::retry::{RetryPolicy, retry_with_backoff};

/// Header carrying the store API token.
const AUTH_HEADER: &str = "X-Auth-Token";

/// Optional filters for an orders listing, forwarded as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status_id: Option<u32>,
}

impl OrderListQuery {
    fn pairs(&self) -> impl Iterator<Item = (&'static str, u32)> {
        [
            ("page", self.page),
            ("limit", self.limit),
            ("status_id", self.status_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// BigCommerce REST client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct BigCommerceClient {
    inner: Arc<BigCommerceClientInner>,
}

struct BigCommerceClientInner {
    client: reqwest::Client,
    api_base: Url,
    retry: RetryPolicy,
}

impl std::fmt::Debug for BigCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("max_attempts", &self.inner.retry.max_attempts)
            .finish_non_exhaustive()
    }
}

impl BigCommerceClient {
    /// Create a client from upstream settings.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, BigCommerceError> {
        Self::with_retry_policy(config, RetryPolicy::with_max_attempts(config.max_attempts))
    }

    /// Create a client with an explicit retry schedule.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the HTTP client cannot be built.
    pub fn with_retry_policy(
        config: &UpstreamConfig,
        retry: RetryPolicy,
    ) -> Result<Self, BigCommerceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BigCommerceClientInner {
                client,
                api_base: config.api_base.clone(),
                retry,
            }),
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch the store's orders.
    ///
    /// A `204 No Content` answer (no orders match) is returned as `[]`.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Upstream` for a non-success status and
    /// `BigCommerceError::Http` if the store cannot be reached.
    #[instrument(skip(self, conn), fields(store_hash = %conn.store_hash()))]
    pub async fn list_orders(
        &self,
        conn: &StoreConnection,
        query: &OrderListQuery,
    ) -> Result<Value, BigCommerceError> {
        let mut url = self.orders_url(conn, None)?;
        let mut pairs = query.pairs().peekable();
        if pairs.peek().is_some() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in pairs {
                serializer.append_pair(key, &value.to_string());
            }
        }

        let response = self.send(Method::GET, &url, conn, None).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Array(Vec::new()));
        }
        read_json(response).await
    }

    /// Mark one order approved.
    ///
    /// Returns the updated order as the store reports it. The status code alone
    /// decides success: a 2xx answer whose body is empty or not JSON still
    /// means the update was applied, and yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Upstream` for a non-success status and
    /// `BigCommerceError::Http` if the store cannot be reached.
    #[instrument(skip(self, conn), fields(store_hash = %conn.store_hash()))]
    pub async fn approve_order(
        &self,
        conn: &StoreConnection,
        order_id: OrderId,
    ) -> Result<Value, BigCommerceError> {
        let url = self.orders_url(conn, Some(order_id))?;
        let update = StatusUpdate::approved();

        let response = self.send(Method::PUT, &url, conn, Some(&update)).await?;
        tracing::info!(%order_id, "Order approved");
        Ok(read_updated_order(response).await)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// `{base}/stores/{hash}/v2/orders[/{id}]`
    fn orders_url(
        &self,
        conn: &StoreConnection,
        order_id: Option<OrderId>,
    ) -> Result<Url, BigCommerceError> {
        let mut url = self.inner.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| BigCommerceError::InvalidUrl(self.inner.api_base.to_string()))?;
            segments
                .pop_if_empty()
                .extend(["stores", conn.store_hash().as_str(), "v2", "orders"]);
            if let Some(order_id) = order_id {
                segments.push(&order_id.to_string());
            }
        }
        Ok(url)
    }

    /// Send a request, retrying transient failures, and reject non-success
    /// statuses.
    async fn send(
        &self,
        method: Method,
        url: &Url,
        conn: &StoreConnection,
        body: Option<&StatusUpdate>,
    ) -> Result<Response, BigCommerceError> {
        retry_with_backoff(&self.inner.retry, BigCommerceError::is_retryable, move || {
            self.send_once(method.clone(), url.clone(), conn, body)
        })
        .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        conn: &StoreConnection,
        body: Option<&StatusUpdate>,
    ) -> Result<Response, BigCommerceError> {
        let mut request = self
            .inner
            .client
            .request(method, url)
            .header(AUTH_HEADER, conn.api_token().expose_secret())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "BigCommerce request failed");
        Err(BigCommerceError::Upstream { status, body })
    }
}

async fn read_json(response: Response) -> Result<Value, BigCommerceError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_updated_order(response: Response) -> Value {
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read approved order body");
            return Value::Null;
        }
    };
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Approved order body is not JSON");
        Value::Null
    })
}
