//! Business logic services.
//!
//! # Services
//!
//! - `bulk_approval` - Concurrent per-order approval with per-item outcomes
//! - `retry` - Exponential backoff for transient upstream failures

pub mod bulk_approval;
pub mod retry;

pub use bulk_approval::{BulkApprovalError, OrderApprover, approve_all};
pub use retry::{RetryPolicy, retry_with_backoff};
