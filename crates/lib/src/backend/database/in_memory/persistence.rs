//! Persistence operations for the InMemory backend
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory namespaces to/from JSON files.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::{InMemory, NamespaceMap};
use crate::{
    Error, Result,
    backend::{Namespace, errors::BackendError},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout: `{"account": {...}, "pref": {...}}`.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(rename = "account", default)]
    accounts: NamespaceMap,
    #[serde(rename = "pref", default)]
    preferences: NamespaceMap,
}

pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let snapshot = {
        let data = backend.data.read().await;
        let take = |ns: Namespace| data.get(&ns).cloned().unwrap_or_else(BTreeMap::new);
        Snapshot {
            version: PERSISTENCE_VERSION,
            accounts: take(Namespace::Accounts),
            preferences: take(Namespace::Preferences),
        }
    };

    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| -> Error {
        BackendError::InvalidPersistenceFile {
            reason: e.to_string(),
        }
        .into()
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::InvalidPersistenceFile {
                    reason: e.to_string(),
                }
                .into()
            })?;
            let mut data = HashMap::new();
            data.insert(Namespace::Accounts, snapshot.accounts);
            data.insert(Namespace::Preferences, snapshot.preferences);
            Ok(InMemory::from_data(data))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
