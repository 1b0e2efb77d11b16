//! Registry errors.

use std::path::PathBuf;

use orderdesk_core::{StoreConnectionError, StoreId};
use thiserror::Error;

/// Errors that can occur when using the store registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller supplied missing or malformed credentials.
    #[error(transparent)]
    Invalid(#[from] StoreConnectionError),

    /// No store with this id is registered.
    #[error("Store not found: {0}")]
    NotFound(StoreId),

    /// The registry file could not be read or written.
    #[error("Registry I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but is not a valid registry record.
    #[error("Registry file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
