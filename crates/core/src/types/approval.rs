//! Order approval types.

use serde::{Deserialize, Serialize};

use super::id::OrderId;

/// Upstream status id written when an order is approved.
///
/// This workflow treats status `11` as "Completed". It is a fixed policy
/// value, not configuration.
pub const APPROVED_STATUS_ID: u32 = 11;

/// Body of an upstream order status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status_id: u32,
}

impl StatusUpdate {
    /// The update that marks an order approved.
    #[must_use]
    pub const fn approved() -> Self {
        Self {
            status_id: APPROVED_STATUS_ID,
        }
    }
}

/// One order that could not be approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedApproval {
    pub order_id: OrderId,
    /// Upstream error detail captured when the call failed.
    pub error: String,
}

/// Outcome of a bulk approval.
///
/// `succeeded` and the ids in `failed` partition the (deduplicated) input:
/// each id appears exactly once across the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    #[serde(rename = "success")]
    pub succeeded: Vec<OrderId>,
    pub failed: Vec<FailedApproval>,
}

impl ApprovalResult {
    /// Record a confirmed approval.
    pub fn push_success(&mut self, order_id: OrderId) {
        self.succeeded.push(order_id);
    }

    /// Record a failed approval with its error detail.
    pub fn push_failure(&mut self, order_id: OrderId, error: impl Into<String>) {
        self.failed.push(FailedApproval {
            order_id,
            error: error.into(),
        });
    }

    /// True when no order failed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of orders accounted for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when the result covers no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
