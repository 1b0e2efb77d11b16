//! Core types for Order Desk.
//!
//! This module provides type-safe wrappers for the store connection and
//! order approval domain.

pub mod approval;
pub mod id;
pub mod order;
pub mod store;

pub use approval::{APPROVED_STATUS_ID, ApprovalResult, FailedApproval, StatusUpdate};
pub use id::{InvalidOrderId, OrderId, StoreId};
pub use order::{CustomerSummary, OrderSummary, OrderSummaryError, summarize_orders};
pub use store::{
    StoreConnection, StoreConnectionError, StoreHash, StoreSummary, default_store_name,
};
