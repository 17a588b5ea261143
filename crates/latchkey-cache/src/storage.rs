//! Storage backends.
//!
//! This module defines the contract the request cache writes through. It is
//! deliberately close to the Web Storage API: string keys, string values,
//! synchronous calls. [`MemoryStorage`] is the in-process implementation used
//! outside the browser and in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::Result;

/// A string-keyed storage medium.
///
/// Implementations are not required to be thread-safe: a cache and its
/// backend live on one thread, the way a browser tab does.
pub trait StorageBackend {
    /// Get the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str);

    /// Whether `key` has a value.
    fn contains_key(&self, key: &str) -> bool {
        self.get_item(key).is_some()
    }

    /// Every key currently stored, including keys not written by this crate.
    fn keys(&self) -> Vec<String>;

    /// Remove every entry.
    fn clear(&self);
}

/// In-memory storage medium.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
