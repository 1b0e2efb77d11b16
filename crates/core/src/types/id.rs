//! Newtype IDs for type-safe entity references.
//!
//! `StoreId` is generated locally when a store is connected. `OrderId` is
//! owned by the upstream commerce API and only ever parsed, never minted.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Locally generated identifier for a store connection.
///
/// New identifiers are UUIDv7 strings, so they sort in creation order.
/// Identifiers loaded from older registry files are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    /// Generate a fresh, time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier (e.g. a path parameter or a persisted key).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StoreId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for StoreId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when an order identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order id: {0:?} (expected a positive integer)")]
pub struct InvalidOrderId(pub String);

/// Upstream order identifier.
///
/// Serializes as a JSON number. Deserializes from either a number or a
/// numeric string, since callers send both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create an order ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for u64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(InvalidOrderId(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Err(serde::de::Error::custom(InvalidOrderId("0".to_owned()))),
            Raw::Number(id) => Ok(Self(id)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_store_ids_are_unique_and_ordered() {
        let ids: Vec<StoreId> = (0..64).map(|_| StoreId::generate()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_order_id_accepts_numbers_and_numeric_strings() {
        let ids: Vec<OrderId> = serde_json::from_str(r#"[101, "102", " 103 "]"#).unwrap();
        assert_eq!(ids, vec![OrderId::new(101), OrderId::new(102), OrderId::new(103)]);
    }

    #[test]
    fn test_order_id_rejects_garbage() {
        assert!(serde_json::from_str::<OrderId>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<OrderId>("0").is_err());
        assert!(serde_json::from_str::<OrderId>("-4").is_err());
        assert!("12/../13".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_order_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&OrderId::new(7)).unwrap(), "7");
    }
}
