//! TOML-backed preference store

use opendelta_errors::{ConfigError, Error, StorageError};
use opendelta_types::PrefValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{PrefEdit, PreferenceStore};

/// Preference store persisted to a single TOML file.
///
/// The whole map is rewritten on every change: the new contents go to a
/// sibling temporary file which is then renamed over the original, so a
/// reader never observes a half-written file. The in-memory map is only
/// updated after the rename succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, PrefValue>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or does not
    /// contain a flat TOML table of booleans, integers and strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| StorageError::CorruptedData {
                message: format!("{}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "preferences file absent, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(StorageError::from_io_with_path(&e, &path).into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, PrefValue>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::from_io_with_path(&e, parent))?;
            }
        }

        let toml_string = toml::to_string(values).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;
        let content = format!("# OpenDelta preferences, rewritten on every change\n\n{toml_string}");

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content).map_err(|e| StorageError::from_io_with_path(&e, &tmp_path))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::from_io_with_path(&e, &self.path).into());
        }
        Ok(())
    }

    fn modify(&self, edits: &[PrefEdit]) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        for edit in edits {
            match edit {
                PrefEdit::Put(key, value) => {
                    next.insert(key.clone(), value.clone());
                }
                PrefEdit::Remove(key) => {
                    next.remove(key);
                }
            }
        }
        if next == *values {
            return Ok(());
        }
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), Error> {
        self.modify(&[PrefEdit::Put(key.to_string(), value)])
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.modify(&[PrefEdit::Remove(key.to_string())])
    }

    fn apply(&self, edits: &[PrefEdit]) -> Result<(), Error> {
        self.modify(edits)
    }

    fn entries(&self) -> BTreeMap<String, PrefValue> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
