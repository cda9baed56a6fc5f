//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the `BackendImpl` trait,
//! suitable for testing, development, or small deployments that snapshot
//! their state to a JSON file on shutdown.

mod persistence;

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendImpl, Namespace, ReadConcurrency, WriteOp};

type NamespaceMap = BTreeMap<String, String>;

/// A simple in-memory backend keeping one ordered map per namespace.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the namespaces to JSON.
///
/// Reads are [`ReadConcurrency::Shared`] by default. Use
/// [`InMemory::with_read_concurrency`] to emulate a single-handle engine.
#[derive(Debug)]
pub struct InMemory {
    pub(crate) data: RwLock<HashMap<Namespace, NamespaceMap>>,
    read_concurrency: ReadConcurrency,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemory {
    /// Creates a new, empty `InMemory` backend.
    pub fn new() -> Self {
        Self::from_data(HashMap::new())
    }

    pub(crate) fn from_data(data: HashMap<Namespace, NamespaceMap>) -> Self {
        Self {
            data: RwLock::new(data),
            read_concurrency: ReadConcurrency::Shared,
        }
    }

    /// Sets the concurrency contract this backend reports.
    pub fn with_read_concurrency(mut self, read_concurrency: ReadConcurrency) -> Self {
        self.read_concurrency = read_concurrency;
        self
    }

    /// Number of keys stored in a namespace.
    pub async fn len(&self, namespace: Namespace) -> usize {
        self.data
            .read()
            .await
            .get(&namespace)
            .map_or(0, BTreeMap::len)
    }

    /// Saves every namespace to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the backend state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` backend is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` backend or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<String> {
        let data = self.data.read().await;
        data.get(&namespace)
            .and_then(|map| map.get(key))
            .cloned()
            .ok_or_else(|| {
                BackendError::KeyNotFound {
                    namespace,
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn put(&self, namespace: Namespace, key: &str, value: String) -> Result<()> {
        let mut data = self.data.write().await;
        data.entry(namespace).or_default().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> Result<()> {
        let mut data = self.data.write().await;
        match data.get_mut(&namespace).and_then(|map| map.remove(key)) {
            Some(_) => Ok(()),
            None => Err(BackendError::KeyNotFound {
                namespace,
                key: key.to_string(),
            }
            .into()),
        }
    }

    async fn keys(&self, namespace: Namespace) -> Result<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .get(&namespace)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn scan(&self, namespace: Namespace) -> Result<Vec<(String, String)>> {
        let data = self.data.read().await;
        Ok(data
            .get(&namespace)
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn write_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        // Holding the write lock for the whole batch makes it atomic to readers.
        let mut data = self.data.write().await;
        for op in ops {
            match op {
                WriteOp::Put {
                    namespace,
                    key,
                    value,
                } => {
                    data.entry(namespace).or_default().insert(key, value);
                }
                WriteOp::Delete { namespace, key } => {
                    if let Some(map) = data.get_mut(&namespace) {
                        map.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn read_concurrency(&self) -> ReadConcurrency {
        self.read_concurrency
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
