//! Credential registry for connected stores.
//!
//! Owns the mapping from locally generated [`StoreId`]s to
//! [`StoreConnection`]s. It is the only component that stores API tokens.
//!
//! # Durability
//!
//! Every mutation rewrites the full registry before returning. Persistence is
//! best effort and not transactional: if the write fails, the in-memory change
//! stays in place, the failure is logged, and the caller still sees success.
//! A crash between the mutation and the write loses that mutation.
//!
//! Persisted entries that fail validation at load time are not served but are
//! written back on every save. `remove` deletes them like any other entry.

mod backend;
mod error;

pub use backend::{Backend, Snapshot};
pub use error::RegistryError;

use orderdesk_core::{StoreConnection, StoreId, StoreSummary};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::RegistryConfig;

/// Store credential registry.
///
/// Construct once at startup and share by reference (it lives inside
/// `AppState`). Writers are serialized by an internal lock that is held across
/// the persistence write, so the file always reflects the latest committed
/// map.
#[derive(Debug)]
pub struct StoreRegistry {
    state: RwLock<Snapshot>,
    backend: Backend,
}

impl StoreRegistry {
    /// Open the registry described by `config`, loading any persisted state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if an existing registry file cannot be read or
    /// parsed.
    pub async fn open(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let backend = match config {
            RegistryConfig::File(path) => Backend::File(path.clone()),
            RegistryConfig::Memory => Backend::Memory,
        };
        Self::with_backend(backend).await
    }

    /// Open a registry on an explicit backend.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the backend's persisted state cannot be loaded.
    pub async fn with_backend(backend: Backend) -> Result<Self, RegistryError> {
        let snapshot = backend.load().await?;
        Ok(Self {
            state: RwLock::new(snapshot),
            backend,
        })
    }

    /// An empty registry that persists nothing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(Snapshot::default()),
            backend: Backend::Memory,
        }
    }

    /// Register a new store connection.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Invalid` if the store hash or token is missing
    /// or malformed. The registry is left unchanged in that case.
    #[instrument(skip(self, api_token))]
    pub async fn connect(
        &self,
        store_hash: &str,
        api_token: &str,
        name: Option<&str>,
    ) -> Result<StoreSummary, RegistryError> {
        let mut state = self.state.write().await;

        let mut id = StoreId::generate();
        while state.stores.contains_key(&id) || state.unusable.contains_key(id.as_str()) {
            id = StoreId::generate();
        }

        let conn = StoreConnection::new(&id, store_hash, api_token, name)?;
        let summary = conn.summary(&id);
        state.stores.insert(id, conn);

        self.persist(&state).await;
        tracing::info!(store_id = %summary.id, name = %summary.name, "Store connected");

        Ok(summary)
    }

    /// All connections, without credentials, ordered by id.
    pub async fn list(&self) -> Vec<StoreSummary> {
        self.state
            .read()
            .await
            .stores
            .iter()
            .map(|(id, conn)| conn.summary(id))
            .collect()
    }

    /// Remove a store connection.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &StoreId) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;

        if let Some(removed) = state.stores.remove(id) {
            tracing::info!(store_id = %id, name = %removed.name(), "Store removed");
        } else if state.unusable.remove(id.as_str()).is_some() {
            tracing::info!(store_id = %id, "Unusable registry entry removed");
        } else {
            return Err(RegistryError::NotFound(id.clone()));
        }

        self.persist(&state).await;
        Ok(())
    }

    /// Look up the credentials for a store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if the id is unknown.
    pub async fn get(&self, id: &StoreId) -> Result<StoreConnection, RegistryError> {
        self.state
            .read()
            .await
            .stores
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Number of usable stores.
    pub async fn len(&self) -> usize {
        self.state.read().await.stores.len()
    }

    /// The backend this registry persists to.
    #[must_use]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    async fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.backend.save(snapshot).await {
            tracing::error!(error = %e, "Failed to persist store registry");
        }
    }
}
