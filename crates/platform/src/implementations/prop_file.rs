//! Property lookups from `build.prop` style files

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::identity::IdentitySource;

/// Properties parsed once from one or more `key=value` files.
///
/// Blank lines, `#` comments and lines without `=` are skipped. When a key
/// appears more than once the last definition wins, across files in the
/// order they were given.
#[derive(Debug, Clone, Default)]
pub struct PropFileSource {
    properties: HashMap<String, String>,
    files: Vec<PathBuf>,
}

impl PropFileSource {
    /// Load the given files. Unreadable files are logged and skipped.
    pub fn open<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut source = Self::default();
        for path in paths {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    source.extend_from_str(&contents);
                    source.files.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read property file");
                }
            }
        }
        source
    }

    /// Parse properties from an in-memory string
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut source = Self::default();
        source.extend_from_str(contents);
        source
    }

    fn extend_from_str(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    self.properties
                        .insert(key.to_string(), value.trim().to_string());
                }
            }
        }
    }

    /// Files that were read successfully
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl IdentitySource for PropFileSource {
    fn lookup(&self, key: &str) -> String {
        self.properties.get(key).cloned().unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "prop-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_prop_lines() {
        let source = PropFileSource::parse(
            "# begin build properties\n\
             ro.omni.version=13-20240101-guacamole-WEEKLY\n\
             \n\
             import /vendor/build.prop\n\
             ro.omni.device = guacamole \n\
             ro.build.ab_update=true\n\
             ro.omni.device=guacamoleb\n",
        );
        assert_eq!(source.len(), 3);
        assert_eq!(source.lookup("ro.omni.device"), "guacamoleb");
        assert_eq!(source.lookup("ro.build.ab_update"), "true");
        assert_eq!(source.lookup("ro.missing"), "");
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let source = PropFileSource::open(["/nonexistent/build.prop"]);
        assert!(source.is_empty());
        assert!(source.files().is_empty());
    }
}
