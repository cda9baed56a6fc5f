use super::{PreferenceCache, PreferenceValue};
use crate::Result;
use crate::account::Identity;

/// Preferences of one feature area, addressed by bare name.
///
/// `scoped.get(id, "theme")` reads the key `"<scope>.theme"`.
#[derive(Debug, Clone)]
pub struct ScopedPreferences {
    scope: String,
    cache: PreferenceCache,
}

impl ScopedPreferences {
    pub(super) fn new(scope: String, cache: PreferenceCache) -> Self {
        Self { scope, cache }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Full key for `name` in this scope.
    pub fn key(&self, name: &str) -> String {
        format!("{}.{name}", self.scope)
    }

    pub async fn get(&self, identity: &Identity, name: &str) -> Result<Option<PreferenceValue>> {
        self.cache.get(identity, &self.key(name)).await
    }

    pub async fn set(
        &self,
        identity: &Identity,
        name: &str,
        value: Option<PreferenceValue>,
    ) -> Result<()> {
        self.cache.set(identity, &self.key(name), value).await
    }

    pub async fn define_default(
        &self,
        identity: &Identity,
        name: &str,
        default: PreferenceValue,
    ) -> Result<PreferenceValue> {
        self.cache
            .define_default(identity, &self.key(name), default)
            .await
    }
}
