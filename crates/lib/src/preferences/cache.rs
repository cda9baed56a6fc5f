//! Resident preference documents, keyed by account identity.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::PreferenceDocument;
use crate::account::Identity;

#[derive(Debug, Default)]
struct CacheState {
    documents: HashMap<Identity, PreferenceDocument>,
    /// Identities of deleted accounts. Identities are never reissued, so an
    /// entry here is permanent.
    retired: HashSet<Identity>,
}

/// Shared map of documents that have been read or written since open.
///
/// Shared between the preference cache and the account store, which evicts
/// a document when its account is deleted. An evicted identity is retired
/// and can never become resident again.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentCache {
    state: Arc<RwLock<CacheState>>,
}

impl DocumentCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the resident document, or returns `None` on a miss.
    pub(crate) async fn with<R>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&PreferenceDocument) -> R,
    ) -> Option<R> {
        self.state.read().await.documents.get(identity).map(f)
    }

    pub(crate) async fn contains(&self, identity: &Identity) -> bool {
        self.state.read().await.documents.contains_key(identity)
    }

    pub(crate) async fn is_retired(&self, identity: &Identity) -> bool {
        self.state.read().await.retired.contains(identity)
    }

    /// Makes `document` the resident copy. Returns false, and stores
    /// nothing, if the identity is retired.
    pub(crate) async fn insert(&self, identity: Identity, document: PreferenceDocument) -> bool {
        let mut state = self.state.write().await;
        if state.retired.contains(&identity) {
            return false;
        }
        state.documents.insert(identity, document);
        true
    }

    /// Inserts `document` unless one is already resident, and returns the resident copy.
    ///
    /// Returns `None` if the identity is retired.
    pub(crate) async fn insert_if_absent(
        &self,
        identity: Identity,
        document: PreferenceDocument,
    ) -> Option<PreferenceDocument> {
        let mut state = self.state.write().await;
        if state.retired.contains(&identity) {
            return None;
        }
        Some(state.documents.entry(identity).or_insert(document).clone())
    }

    /// Drops a resident document and retires the identity. Returns true if
    /// a document was resident.
    pub(crate) async fn evict(&self, identity: &Identity) -> bool {
        let mut state = self.state.write().await;
        state.retired.insert(identity.clone());
        state.documents.remove(identity).is_some()
    }

    pub(crate) async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }
}
