use std::collections::HashMap;
use std::sync::RwLock;

/// Resolves secret names to their values.
pub trait SecretStore: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Secret store backed by a map, for tests and embedded setups.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut secrets) = self.secrets.write() {
            secrets.insert(name.into(), value.into());
        }
    }
}

impl SecretStore for InMemorySecretStore {
    fn resolve(&self, name: &str) -> Option<String> {
        self.secrets.read().ok()?.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inserted_secrets() {
        let store = InMemorySecretStore::new().with_secret("token", "abc");
        store.insert("other", "xyz");
        assert_eq!(store.resolve("token").as_deref(), Some("abc"));
        assert_eq!(store.resolve("other").as_deref(), Some("xyz"));
        assert_eq!(store.resolve("missing"), None);
    }
}
