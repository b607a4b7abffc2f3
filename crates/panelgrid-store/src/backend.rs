#![forbid(unsafe_code)]

//! Key-value store seam and the in-memory backend.
//!
//! Every preference is a string value under a string key, matching what a
//! browser's local storage or a desktop settings file can hold. Writes are
//! synchronous and last-writer-wins.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Failure from a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded writing `{key}` ({bytes} bytes)")]
    QuotaExceeded { key: String, bytes: usize },
    #[error("storage I/O failed: {0}")]
    Io(String),
    #[error("storage file `{path}` is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("unsupported storage file version {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u64 },
    #[error("failed to serialize storage contents: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// String key-value storage.
pub trait KeyValueStore {
    /// Value under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}

/// Shared handle, so several controllers (tabs) can sit on one store.
///
/// A re-entrant borrow reports [`StoreError::Unavailable`] instead of
/// panicking.
impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.try_borrow()
            .map_err(|_| StoreError::Unavailable)?
            .get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.try_borrow_mut()
            .map_err(|_| StoreError::Unavailable)?
            .set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        self.try_borrow_mut()
            .map_err(|_| StoreError::Unavailable)?
            .remove(key)
    }
}

/// In-memory store with optional quota and failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    unavailable: bool,
    writes: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Convenience for sharing one store between controllers.
    #[must_use]
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of successful `set` and `remove` calls that changed state.
    #[must_use]
    pub const fn write_count(&self) -> u64 {
        self.writes
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        if let Some(quota) = self.quota_bytes {
            let bytes = key.len() + value.len();
            if self.used_bytes_without(key) + bytes > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_owned(),
                    bytes,
                });
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.writes += 1;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryStore, StoreError};

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), Ok(None));
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Ok(Some("v".to_owned())));
        assert_eq!(store.remove("k"), Ok(true));
        assert_eq!(store.remove("k"), Ok(false));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn quota_counts_replacement_not_accumulation() {
        let mut store = MemoryStore::with_quota(8);
        store.set("k", "1234567").unwrap();
        store.set("k", "7654321").unwrap();
        let err = store.set("other", "x").unwrap_err();
        assert_eq!(
            err,
            StoreError::QuotaExceeded {
                key: "other".to_owned(),
                bytes: 6
            }
        );
    }

    #[test]
    fn shared_handles_see_each_others_writes() {
        let shared = MemoryStore::new().shared();
        let mut tab_a = shared.clone();
        let tab_b = shared.clone();
        tab_a.set("k", "from-a").unwrap();
        assert_eq!(tab_b.get("k"), Ok(Some("from-a".to_owned())));
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);
        assert_eq!(store.get("k"), Err(StoreError::Unavailable));
        assert_eq!(store.set("k", "v"), Err(StoreError::Unavailable));
        assert_eq!(store.remove("k"), Err(StoreError::Unavailable));
    }
}
