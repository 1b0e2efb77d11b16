//! Subcommand implementations.
//!
//! Commands open the same registry file as the server, but a running server
//! holds its own copy in memory and rewrites the file on its next connect or
//! remove. Store edits made here are therefore lost unless the server is
//! stopped first or restarted right after. Order commands only read the
//! registry and are safe to run alongside the server.

use orderdesk_server::bigcommerce::BigCommerceError;
use orderdesk_server::config::ConfigError;
use orderdesk_server::registry::RegistryError;
use orderdesk_server::services::BulkApprovalError;
use orderdesk_server::state::StateError;
use orderdesk_server::{AppState, ServerConfig};
use thiserror::Error;

pub mod orders;
pub mod stores;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup error: {0}")]
    State(#[from] StateError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("BigCommerce error: {0}")]
    BigCommerce(#[from] BigCommerceError),

    #[error(transparent)]
    BulkApproval(#[from] BulkApprovalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Some orders in a bulk approval were not approved.
    #[error("{failed} of {total} orders could not be approved")]
    ApprovalsFailed { failed: usize, total: usize },
}

/// Registry and upstream client, loaded from the server's environment.
pub struct Context {
    state: AppState,
}

impl Context {
    /// Load configuration and open the store registry.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if configuration is invalid or the registry
    /// file cannot be loaded.
    pub async fn load() -> Result<Self, CommandError> {
        let config = ServerConfig::from_env()?;
        let state = AppState::new(config).await?;
        Ok(Self { state })
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }
}
