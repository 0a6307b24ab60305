#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Persistent key-value store for user preferences
//!
//! The configuration layer never caches preference values; every typed
//! getter goes back to a [`PreferenceStore`]. A write that returned `Ok` is
//! visible to the next read of the same key.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use opendelta_errors::Error;
use opendelta_types::PrefValue;
use std::collections::BTreeMap;

/// One change inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefEdit {
    Put(String, PrefValue),
    Remove(String),
}

impl PrefEdit {
    pub fn put(key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        Self::Put(key.into(), value.into())
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove(key.into())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Put(key, _) | Self::Remove(key) => key,
        }
    }
}

/// Untyped preference storage.
///
/// Each single-key write is atomic. [`PreferenceStore::apply`] applies a
/// batch; implementations may do so in one write but callers must not rely
/// on cross-key atomicity.
pub trait PreferenceStore: Send + Sync {
    /// Current value of `key`, `None` when never written or removed
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted. The previous
    /// value stays in place in that case.
    fn put(&self, key: &str, value: PrefValue) -> Result<(), Error>;

    /// Forget `key`; removing an absent key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be persisted.
    fn remove(&self, key: &str) -> Result<(), Error>;

    /// Apply several edits in order
    ///
    /// # Errors
    ///
    /// Returns the first persistence error; edits before it stay applied.
    fn apply(&self, edits: &[PrefEdit]) -> Result<(), Error> {
        for edit in edits {
            match edit {
                PrefEdit::Put(key, value) => self.put(key, value.clone())?,
                PrefEdit::Remove(key) => self.remove(key)?,
            }
        }
        Ok(())
    }

    /// Every stored key and value, sorted by key
    fn entries(&self) -> BTreeMap<String, PrefValue>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<PrefValue> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), Error> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }

    fn apply(&self, edits: &[PrefEdit]) -> Result<(), Error> {
        (**self).apply(edits)
    }

    fn entries(&self) -> BTreeMap<String, PrefValue> {
        (**self).entries()
    }
}
