//! Blocking filesystem helpers on the managed storage directory
//!
//! Neither helper reports filesystem errors to the caller. An unreadable
//! directory is the same as an empty one.

use opendelta_platform::FilesystemOperations;
use std::path::{Path, PathBuf};

use crate::locators::ResolvedLocators;

const ZIP_SUFFIX: &str = ".zip";

fn has_zip_suffix(name: &str) -> bool {
    name.len() >= ZIP_SUFFIX.len()
        && name
            .get(name.len() - ZIP_SUFFIX.len()..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(ZIP_SUFFIX))
}

/// Zips queued for flashing after the next update, sorted by path.
///
/// An entry is kept only when it is a regular file, its name ends in
/// `.zip` in any case, and its resolved path lies inside the storage base.
/// Symlinks pointing out of the base are dropped.
#[must_use]
pub fn flash_after_update_zips(
    fs: &dyn FilesystemOperations,
    locators: &ResolvedLocators,
) -> Vec<PathBuf> {
    let dir = locators.flash_after_update_dir();
    let entries = match fs.list_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "flash-after-update directory not readable");
            return Vec::new();
        }
    };

    let base = locators.path_base_dir();
    let canonical_base = fs.canonicalize(base).ok();
    let inside_base = |path: &Path| {
        path.starts_with(base) || canonical_base.as_deref().is_some_and(|b| path.starts_with(b))
    };

    let mut zips: Vec<PathBuf> = entries
        .into_iter()
        .filter(|entry| entry.is_file && has_zip_suffix(&entry.name))
        .filter(|entry| {
            let inside = inside_base(&entry.path);
            if !inside {
                tracing::warn!(
                    name = %entry.name,
                    resolved = %entry.path.display(),
                    "ignoring zip outside the storage directory"
                );
            }
            inside
        })
        .map(|entry| entry.path)
        .collect();
    zips.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    zips
}

/// Delete every regular file in the storage base whose name starts with
/// the Android-release file prefix. Returns how many were deleted.
pub fn clean_prefixed_files(fs: &dyn FilesystemOperations, locators: &ResolvedLocators) -> usize {
    let prefix = locators.filename_base_prefix.as_str();
    if prefix.is_empty() {
        tracing::warn!("file name prefix is empty, refusing to clean");
        return 0;
    }

    let base = locators.path_base_dir();
    let entries = match fs.list_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %base.display(), error = %e, "storage directory not readable");
            return 0;
        }
    };

    let mut deleted = 0;
    for entry in entries
        .iter()
        .filter(|entry| entry.is_file && entry.name.starts_with(prefix))
    {
        let target = base.join(&entry.name);
        match fs.remove_file(&target) {
            Ok(()) => {
                tracing::debug!(path = %target.display(), "deleted");
                deleted += 1;
            }
            Err(e) => tracing::warn!(path = %target.display(), error = %e, "could not delete"),
        }
    }
    tracing::info!(deleted, prefix, "cleaned storage directory");
    deleted
}
