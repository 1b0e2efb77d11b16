//! Durable storage for the store registry.
//!
//! The file layout is a single JSON object keyed by store id:
//!
//! ```json
//! {
//!   "0192f0c4-...": { "storeHash": "abc123", "apiToken": "...", "name": "Main shop" }
//! }
//! ```
//!
//! The whole object is rewritten on every mutation. Writes go to a sibling
//! temp file that is fsynced and then renamed over the target, so readers
//! never observe a half-written record.
//!
//! Entries that no longer validate (for example a legacy store hash with
//! punctuation) are not served, but they are carried through every save
//! verbatim. Only an explicit remove deletes them from disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use orderdesk_core::{StoreConnection, StoreId};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use super::RegistryError;

/// On-disk shape of one connection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStore {
    store_hash: String,
    api_token: String,
    #[serde(default)]
    name: String,
}

/// Registry contents, as loaded from and saved to a backend.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Usable connections.
    pub stores: BTreeMap<StoreId, StoreConnection>,
    /// Persisted entries that failed validation, kept as raw JSON.
    pub unusable: BTreeMap<String, Value>,
}

/// Storage backend for the registry.
#[derive(Debug, Clone)]
pub enum Backend {
    /// JSON file rewritten on every mutation.
    File(PathBuf),
    /// Process memory only; nothing survives a restart.
    Memory,
}

impl Backend {
    /// Load the persisted registry.
    ///
    /// A missing file is an empty registry. Entries whose credentials no
    /// longer validate are set aside in [`Snapshot::unusable`] with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` if the file cannot be read and
    /// `RegistryError::Corrupt` if it is not a JSON object.
    pub async fn load(&self) -> Result<Snapshot, RegistryError> {
        let Self::File(path) = self else {
            return Ok(Snapshot::default());
        };

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No registry file yet, starting empty");
                return Ok(Snapshot::default());
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };

        let entries: BTreeMap<String, Value> =
            serde_json::from_slice(&raw).map_err(|source| RegistryError::Corrupt {
                path: path.clone(),
                source,
            })?;

        let mut snapshot = Snapshot::default();
        for (id, entry) in entries {
            match parse_entry(&id, &entry) {
                Ok(conn) => {
                    snapshot.stores.insert(StoreId::new(id), conn);
                }
                Err(reason) => {
                    tracing::warn!(
                        store_id = %id,
                        error = %reason,
                        "Registry entry is not usable, keeping it on disk"
                    );
                    snapshot.unusable.insert(id, entry);
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            count = snapshot.stores.len(),
            unusable = snapshot.unusable.len(),
            "Loaded store registry"
        );
        Ok(snapshot)
    }

    /// Write the full registry state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` if any step of the write fails.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), RegistryError> {
        let Self::File(path) = self else {
            return Ok(());
        };

        let corrupt = |source| RegistryError::Corrupt {
            path: path.clone(),
            source,
        };
        let mut persisted: BTreeMap<&str, Value> = snapshot
            .unusable
            .iter()
            .map(|(id, entry)| (id.as_str(), entry.clone()))
            .collect();
        for (id, conn) in &snapshot.stores {
            let record = PersistedStore {
                store_hash: conn.store_hash().to_string(),
                api_token: conn.api_token().expose_secret().to_owned(),
                name: conn.name().to_owned(),
            };
            persisted.insert(id.as_str(), serde_json::to_value(record).map_err(corrupt)?);
        }

        let json = serde_json::to_vec_pretty(&persisted).map_err(corrupt)?;

        write_atomically(path, &json)
            .await
            .map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })
    }
}

fn parse_entry(id: &str, entry: &Value) -> Result<StoreConnection, String> {
    let record = PersistedStore::deserialize(entry).map_err(|e| e.to_string())?;
    let name = Some(record.name.as_str()).filter(|n| !n.is_empty());
    StoreConnection::new(&StoreId::new(id), &record.store_hash, &record.api_token, name)
        .map_err(|e| e.to_string())
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    // The file holds API tokens
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&tmp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn connection(id: &StoreId, hash: &str, token: &str, name: Option<&str>) -> StoreConnection {
        StoreConnection::new(id, hash, token, name).unwrap()
    }

    fn snapshot(stores: &[(&str, &str, &str, Option<&str>)]) -> Snapshot {
        Snapshot {
            stores: stores
                .iter()
                .map(|(id, hash, token, name)| {
                    let id = StoreId::new(*id);
                    let conn = connection(&id, hash, token, *name);
                    (id, conn)
                })
                .collect(),
            unusable: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::File(dir.path().join("stores.json"));
        let loaded = backend.load().await.unwrap();
        assert!(loaded.stores.is_empty());
        assert!(loaded.unusable.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::File(dir.path().join("nested").join("stores.json"));
        let saved = snapshot(&[
            ("a", "hashA", "tokenA", Some("Alpha")),
            ("b", "hashB", "tokenB", None),
        ]);

        backend.save(&saved).await.unwrap();
        let loaded = backend.load().await.unwrap();

        assert_eq!(loaded.stores.len(), 2);
        let a = loaded.stores.get(&StoreId::new("a")).unwrap();
        assert_eq!(a.store_hash().as_str(), "hashA");
        assert_eq!(a.api_token().expose_secret(), "tokenA");
        assert_eq!(a.name(), "Alpha");
        assert_eq!(loaded.stores.get(&StoreId::new("b")).unwrap().name(), "Store b");
    }

    #[tokio::test]
    async fn test_reads_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        tokio::fs::write(
            &path,
            r#"{
                "1718000000000": {"storeHash": "abc123", "apiToken": "tok", "name": "Legacy"},
                "1718000000001": {"storeHash": "", "apiToken": "tok", "name": "Broken"}
            }"#,
        )
        .await
        .unwrap();

        let loaded = Backend::File(path).load().await.unwrap();
        assert_eq!(loaded.stores.len(), 1);
        let conn = loaded.stores.get(&StoreId::new("1718000000000")).unwrap();
        assert_eq!(conn.name(), "Legacy");
        assert_eq!(conn.store_hash().as_str(), "abc123");
        assert!(loaded.unusable.contains_key("1718000000001"));
    }

    #[tokio::test]
    async fn test_unusable_entries_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        tokio::fs::write(
            &path,
            r#"{"1718000000000": {"storeHash": "abc-123", "apiToken": "legacy-tok", "name": "Old"}}"#,
        )
        .await
        .unwrap();
        let backend = Backend::File(path.clone());

        let mut loaded = backend.load().await.unwrap();
        assert!(loaded.stores.is_empty());
        let id = StoreId::new("new");
        loaded.stores.insert(id.clone(), connection(&id, "def456", "tok", None));
        backend.save(&loaded).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            raw["1718000000000"],
            serde_json::json!({"storeHash": "abc-123", "apiToken": "legacy-tok", "name": "Old"})
        );
        assert_eq!(raw["new"]["storeHash"], "def456");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = Backend::File(path).load().await.unwrap_err();
        assert!(matches!(err, RegistryError::Corrupt { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        Backend::File(path.clone())
            .save(&Snapshot::default())
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_memory_backend_persists_nothing() {
        let backend = Backend::Memory;
        backend.save(&snapshot(&[("x", "h", "t", None)])).await.unwrap();
        assert!(backend.load().await.unwrap().stores.is_empty());
    }
}
