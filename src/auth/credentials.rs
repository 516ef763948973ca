use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "jobdeck";

/// Fixed names for the two persisted secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKey::Access => "accessToken",
            TokenKey::Refresh => "refreshToken",
        }
    }
}

/// Durable storage for the two token secrets. Implementations own the
/// persisted copies; the in-memory session never reads them directly.
pub trait TokenStore: Send + Sync {
    fn save(&self, key: TokenKey, value: &str) -> Result<()>;
    fn get(&self, key: TokenKey) -> Result<Option<String>>;
    fn delete(&self, key: TokenKey) -> Result<()>;
}

/// Token storage in the OS keychain, one entry per key.
pub struct KeyringStore;

impl KeyringStore {
    fn entry(key: TokenKey) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key.as_str()).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringStore {
    fn save(&self, key: TokenKey, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn delete(&self, key: TokenKey) -> Result<()> {
        // A missing entry is fine; logout must be idempotent
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// In-process token storage for tests and headless environments.
#[derive(Default)]
pub struct MemoryStore {
    tokens: Mutex<HashMap<TokenKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TokenKey, String>> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryStore {
    fn save(&self, key: TokenKey, value: &str) -> Result<()> {
        self.lock().insert(key, value.to_string());
        Ok(())
    }

    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        Ok(self.lock().get(&key).cloned())
    }

    fn delete(&self, key: TokenKey) -> Result<()> {
        self.lock().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_wire_names() {
        assert_eq!(TokenKey::Access.as_str(), "accessToken");
        assert_eq!(TokenKey::Refresh.as_str(), "refreshToken");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);

        store.save(TokenKey::Access, "A1").unwrap();
        store.save(TokenKey::Refresh, "R1").unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));

        store.delete(TokenKey::Access).unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        // Refresh key untouched
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete(TokenKey::Refresh).is_ok());
    }
}
