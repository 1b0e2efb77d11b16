//! Order Desk Core - Shared types library.
//!
//! This crate provides the domain types used by the other Order Desk crates:
//! - `server` - REST proxy for connecting stores and approving orders
//! - `cli` - Command-line tools for managing stores and approvals
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Store identifiers and credentials, order ids, approval
//!   outcomes, and order summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
