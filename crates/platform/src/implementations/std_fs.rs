//! Filesystem operations on the local filesystem via `std::fs`

use opendelta_errors::PlatformError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::filesystem::{DirEntryInfo, FilesystemOperations};

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl StdFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn fs_error(operation: &str, path: &Path, err: &io::Error) -> PlatformError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        PlatformError::PermissionDenied {
            operation: operation.to_string(),
            message: path.display().to_string(),
        }
    } else {
        PlatformError::FilesystemOperationFailed {
            operation: operation.to_string(),
            message: format!("{}: {err}", path.display()),
        }
    }
}

impl FilesystemOperations for StdFilesystem {
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>, PlatformError> {
        let entries = fs::read_dir(path).map_err(|e| fs_error("list_dir", path, &e))?;

        let mut listed = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(dir = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let joined = entry.path();
            // Dangling symlinks fail to resolve; keep the joined path and
            // report them as non-files.
            let resolved = fs::canonicalize(&joined).unwrap_or_else(|_| joined.clone());
            let is_file = fs::metadata(&joined).is_ok_and(|meta| meta.is_file());
            listed.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: resolved,
                is_file,
            });
        }
        Ok(listed)
    }

    fn remove_file(&self, path: &Path) -> Result<(), PlatformError> {
        fs::remove_file(path).map_err(|e| fs_error("remove_file", path, &e))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, PlatformError> {
        fs::canonicalize(path).map_err(|e| fs_error("canonicalize", path, &e))
    }
}
