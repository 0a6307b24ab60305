//! In-memory preference store

use opendelta_errors::Error;
use opendelta_types::PrefValue;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::{PrefEdit, PreferenceStore};

/// Preference store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, PrefValue>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Into<String>> FromIterator<(K, PrefValue)> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = (K, PrefValue)>>(iter: T) -> Self {
        Self {
            values: Mutex::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), Error> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn apply(&self, edits: &[PrefEdit]) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        for edit in edits {
            match edit {
                PrefEdit::Put(key, value) => {
                    values.insert(key.clone(), value.clone());
                }
                PrefEdit::Remove(key) => {
                    values.remove(key);
                }
            }
        }
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, PrefValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
