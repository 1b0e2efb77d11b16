//! Application state shared across handlers.

use std::sync::Arc;

use crate::bigcommerce::{BigCommerceClient, BigCommerceError};
use crate::config::ServerConfig;
use crate::registry::{RegistryError, StoreRegistry};

/// Error building the application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("store registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("BigCommerce client: {0}")]
    BigCommerce(#[from] BigCommerceError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the store
/// registry, the upstream client and the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    registry: StoreRegistry,
    bigcommerce: BigCommerceClient,
}

impl AppState {
    /// Create the application state, loading the store registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry file cannot be loaded or the HTTP
    /// client cannot be built.
    pub async fn new(config: ServerConfig) -> Result<Self, StateError> {
        let registry = StoreRegistry::open(&config.registry).await?;
        let bigcommerce = BigCommerceClient::new(&config.upstream)?;
        Ok(Self::from_parts(config, registry, bigcommerce))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn from_parts(
        config: ServerConfig,
        registry: StoreRegistry,
        bigcommerce: BigCommerceClient,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                registry,
                bigcommerce,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the store registry.
    #[must_use]
    pub fn registry(&self) -> &StoreRegistry {
        &self.inner.registry
    }

    /// Get a reference to the BigCommerce client.
    #[must_use]
    pub fn bigcommerce(&self) -> &BigCommerceClient {
        &self.inner.bigcommerce
    }
}
