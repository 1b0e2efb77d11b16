//! Bulk order approval.
//!
//! Fans one approval call out per order through an [`OrderApprover`], waits
//! for every call to settle, and partitions the ids into successes and
//! failures. A failing order never cancels or delays its siblings beyond the
//! concurrency bound.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt};
use orderdesk_core::{ApprovalResult, OrderId, StoreConnection};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::bigcommerce::{BigCommerceClient, BigCommerceError};

/// Errors rejected before any order is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkApprovalError {
    #[error("orderIds must be a non-empty array")]
    EmptyOrderList,
}

/// Something that can approve a single order upstream.
pub trait OrderApprover: Sync {
    /// Mark `order_id` approved, returning the updated order.
    fn approve_order(
        &self,
        conn: &StoreConnection,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Value, BigCommerceError>> + Send;
}

impl OrderApprover for BigCommerceClient {
    fn approve_order(
        &self,
        conn: &StoreConnection,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Value, BigCommerceError>> + Send {
        Self::approve_order(self, conn, order_id)
    }
}

/// Approve every order in `order_ids`.
///
/// Duplicate ids are collapsed to their first occurrence. At most
/// `concurrency` calls are in flight, and a free slot goes to the next order
/// as soon as any call settles, so one slow order never holds back the rest.
/// Results keep the input order.
///
/// # Errors
///
/// Returns `BulkApprovalError::EmptyOrderList` without contacting upstream
/// if `order_ids` is empty.
#[instrument(skip(approver, conn, order_ids), fields(count = order_ids.len()))]
pub async fn approve_all<A: OrderApprover>(
    approver: &A,
    conn: &StoreConnection,
    order_ids: Vec<OrderId>,
    concurrency: NonZeroUsize,
) -> Result<ApprovalResult, BulkApprovalError> {
    if order_ids.is_empty() {
        return Err(BulkApprovalError::EmptyOrderList);
    }

    let mut seen = HashSet::with_capacity(order_ids.len());
    let unique: Vec<OrderId> = order_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    let mut outcomes: Vec<(usize, OrderId, Result<Value, BigCommerceError>)> =
        stream::iter(unique.into_iter().enumerate())
            .map(|(index, order_id)| async move {
                (index, order_id, approver.approve_order(conn, order_id).await)
            })
            .buffer_unordered(concurrency.get())
            .collect()
            .await;
    outcomes.sort_unstable_by_key(|(index, _, _)| *index);

    let mut result = ApprovalResult::default();
    for (_, order_id, outcome) in outcomes {
        match outcome {
            Ok(_) => result.push_success(order_id),
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "Order approval failed");
                result.push_failure(order_id, e.detail());
            }
        }
    }

    tracing::info!(
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "Bulk approval finished"
    );

    Ok(result)
}
