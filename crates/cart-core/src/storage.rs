//! # Durable Storage
//!
//! Key-value persistence for the cart and price records. Records are opaque
//! JSON strings; each owner decides how to (de)serialize its own record.

use crate::error::{CartError, CartResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Record key for the cart contents
pub const CART_KEY: &str = "cart";

/// Record key for the price book
pub const PRICES_KEY: &str = "moviePrices";

/// Record key for the chosen locale
pub const LOCALE_KEY: &str = "locale";

/// String-keyed record storage.
///
/// Calls are synchronous and are made while the cart lock is held, so each
/// mutation is durable before the next one starts. Records are a few KB;
/// implementations backed by slow or remote media should not sit behind
/// this trait.
pub trait KeyValueStore: Send + Sync {
    /// Read a record, `None` if it was never written.
    fn get(&self, key: &str) -> CartResult<Option<String>>;

    /// Replace a record wholesale.
    fn set(&self, key: &str, value: &str) -> CartResult<()>;

    /// Erase a record. Removing a missing record is not an error.
    fn remove(&self, key: &str) -> CartResult<()>;
}

/// Type alias for shared storage (dynamic dispatch)
pub type BoxedStore = Arc<dyn KeyValueStore>;

/// In-process storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> CartResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.records
            .lock()
            .map_err(|_| CartError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> CartResult<Option<String>> {
        Ok(self.records()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CartResult<()> {
        self.records()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CartResult<()> {
        self.records()?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per record inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> CartResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CartResult<()> {
        fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a half-written record
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CartResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("cart").unwrap(), None);

        store.set("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));

        store.remove("cart").unwrap();
        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        assert_eq!(store.get(CART_KEY).unwrap(), None);

        store.set(CART_KEY, r#"[{"id":1}]"#).unwrap();
        assert!(dir.path().join("data/cart.json").exists());
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some(r#"[{"id":1}]"#));

        store.set(CART_KEY, "[]").unwrap();
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("[]"));

        store.remove(CART_KEY).unwrap();
        assert_eq!(store.get(CART_KEY).unwrap(), None);
        store.remove(CART_KEY).unwrap();
    }
}
