//! Order Desk server library.
//!
//! REST proxy that keeps BigCommerce store credentials server-side and lets a
//! dashboard list orders and approve them, one at a time or in bulk.
//!
//! # Security
//!
//! The proxy's own API is unauthenticated. It holds store API tokens with
//! order-modify scope, so bind it to a trusted interface only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bigcommerce;
pub mod config;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
