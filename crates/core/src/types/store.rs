//! Store connection types.
//!
//! A store connection is the credential set used to talk to one tenant of the
//! upstream commerce API. The API token is held as a [`SecretString`] and is
//! never serialized through these types; persistence layers expose it
//! explicitly.

use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

use super::id::StoreId;

/// Errors raised while validating connection credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreConnectionError {
    /// `storeHash` or `apiToken` is missing or blank.
    #[error("Missing storeHash or apiToken")]
    MissingCredentials,

    /// `storeHash` contains characters that cannot appear in an upstream path.
    #[error("Invalid storeHash {0:?}: must be ASCII letters and digits")]
    InvalidStoreHash(String),
}

/// Upstream tenant identifier (the BigCommerce store hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StoreHash(String);

impl StoreHash {
    /// Validate and wrap a store hash.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if the value is blank and
    /// `InvalidStoreHash` if it is not ASCII alphanumeric.
    pub fn parse(value: &str) -> Result<Self, StoreConnectionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(StoreConnectionError::MissingCredentials);
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreConnectionError::InvalidStoreHash(value.to_owned()));
        }
        Ok(Self(value.to_owned()))
    }

    /// Get the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credentials and display name for one connected store.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StoreConnection {
    store_hash: StoreHash,
    api_token: SecretString,
    name: String,
}

impl std::fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConnection")
            .field("store_hash", &self.store_hash)
            .field("api_token", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

impl StoreConnection {
    /// Build a connection from raw caller input.
    ///
    /// Blank or missing names fall back to `"Store <id>"`.
    ///
    /// # Errors
    ///
    /// Returns `StoreConnectionError` if the store hash or token is missing,
    /// blank, or malformed.
    pub fn new(
        id: &StoreId,
        store_hash: &str,
        api_token: &str,
        name: Option<&str>,
    ) -> Result<Self, StoreConnectionError> {
        let api_token = api_token.trim();
        if api_token.is_empty() {
            return Err(StoreConnectionError::MissingCredentials);
        }
        let store_hash = StoreHash::parse(store_hash)?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| default_store_name(id), str::to_owned);

        Ok(Self {
            store_hash,
            api_token: SecretString::from(api_token.to_owned()),
            name,
        })
    }

    /// Upstream tenant identifier.
    #[must_use]
    pub const fn store_hash(&self) -> &StoreHash {
        &self.store_hash
    }

    /// Upstream API token.
    #[must_use]
    pub const fn api_token(&self) -> &SecretString {
        &self.api_token
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Credential-free view of this connection.
    #[must_use]
    pub fn summary(&self, id: &StoreId) -> StoreSummary {
        StoreSummary {
            id: id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Default display name for a store connected without one.
#[must_use]
pub fn default_store_name(id: &StoreId) -> String {
    format!("Store {id}")
}

/// Public listing entry for a store connection. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
}
