//! Filesystem operations used by the maintenance helpers

use opendelta_errors::PlatformError;
use std::path::{Path, PathBuf};

/// One directory entry as seen by the configuration layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name, lossily converted to UTF-8
    pub name: String,
    /// Absolute path with symlinks resolved where possible
    pub path: PathBuf,
    /// True for regular files (after following symlinks)
    pub is_file: bool,
}

/// Trait for the blocking filesystem calls the configuration layer makes
pub trait FilesystemOperations: Send + Sync {
    /// List the entries of a directory (not recursive)
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>, PlatformError>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> Result<(), PlatformError>;

    /// Resolve a path to its absolute, symlink-free form
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, PlatformError>;
}
