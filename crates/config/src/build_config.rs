//! Build-time resources
//!
//! Everything the device image decides: which properties identify the
//! build, the locator templates, signature capability flags, release tags
//! and the keep-screen-on allow-list. Values are loaded from:
//! - Default values (hard-coded, matching the stock resources)
//! - Configuration file (~/.config/opendelta/build.toml)
//! - Environment variables

use opendelta_errors::{ConfigError, Error};
use opendelta_platform::{GetpropSource, IdentitySource, PropFileSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::security::SecurityCapability;

/// Main build configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildConfig {
    #[serde(default)]
    pub properties: PropertyKeys,

    #[serde(default)]
    pub templates: Templates,

    #[serde(default)]
    pub signature: SecurityCapability,

    #[serde(default)]
    pub release: ReleaseTags,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// Names of the device properties the identity is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyKeys {
    #[serde(default = "default_property_version")]
    pub version: String,
    #[serde(default = "default_property_device")]
    pub device: String,
    #[serde(default = "default_property_android_version")]
    pub android_version: String,
    #[serde(default = "default_property_ab_update")]
    pub ab_update: String,
}

/// Locator templates.
///
/// `filename_base` may use `{version}`; the `url_base_*` templates may use
/// `{device}`. Other placeholders are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Templates {
    #[serde(default = "default_filename_base")]
    pub filename_base: String,
    /// Directory name below the storage root
    #[serde(default = "default_path_base")]
    pub path_base: String,
    #[serde(default = "default_url_base_delta")]
    pub url_base_delta: String,
    #[serde(default = "default_url_base_update")]
    pub url_base_update: String,
    #[serde(default = "default_url_base_full")]
    pub url_base_full: String,
    #[serde(default = "default_url_base_full_sum")]
    pub url_base_full_sum: String,
    #[serde(default = "default_url_base_json")]
    pub url_base_json: String,
    #[serde(default)]
    pub url_suffix: String,
}

/// Version tags marking builds published by the project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseTags {
    #[serde(default = "default_official_tag")]
    pub official: String,
    #[serde(default = "default_weekly_tag")]
    pub weekly: String,
    #[serde(default = "default_security_tag")]
    pub security: String,
}

/// Per-device resources
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    /// Devices that must keep the screen on while an update is applied.
    /// `None` when the image ships no list at all.
    #[serde(default)]
    pub keep_screen_on: Option<Vec<String>>,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Shared storage root, `/sdcard` when unset
    pub storage_root: Option<PathBuf>,
    /// Preferences file
    pub preferences: Option<PathBuf>,
    /// `build.prop` style files to read properties from instead of `getprop`
    #[serde(default)]
    pub props_files: Vec<PathBuf>,
}

// Default implementations

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            version: default_property_version(),
            device: default_property_device(),
            android_version: default_property_android_version(),
            ab_update: default_property_ab_update(),
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            filename_base: default_filename_base(),
            path_base: default_path_base(),
            url_base_delta: default_url_base_delta(),
            url_base_update: default_url_base_update(),
            url_base_full: default_url_base_full(),
            url_base_full_sum: default_url_base_full_sum(),
            url_base_json: default_url_base_json(),
            url_suffix: String::new(),
        }
    }
}

impl Default for ReleaseTags {
    fn default() -> Self {
        Self {
            official: default_official_tag(),
            weekly: default_weekly_tag(),
            security: default_security_tag(),
        }
    }
}

// Default value functions for serde
fn default_property_version() -> String {
    "ro.omni.version".to_string()
}

fn default_property_device() -> String {
    "ro.omni.device".to_string()
}

fn default_property_android_version() -> String {
    "ro.build.version.release".to_string()
}

fn default_property_ab_update() -> String {
    "ro.build.ab_update".to_string()
}

fn default_filename_base() -> String {
    "omni-{version}".to_string()
}

fn default_path_base() -> String {
    "OpenDelta".to_string()
}

fn default_url_base_delta() -> String {
    "https://delta.omnirom.org/{device}/".to_string()
}

fn default_url_base_update() -> String {
    "https://dl.omnirom.org/{device}/".to_string()
}

fn default_url_base_full() -> String {
    "https://dl.omnirom.org/{device}/".to_string()
}

fn default_url_base_full_sum() -> String {
    "https://dl.omnirom.org/{device}/".to_string()
}

fn default_url_base_json() -> String {
    "https://dl.omnirom.org/json.php?device={device}&path=/{device}".to_string()
}

fn default_official_tag() -> String {
    "OFFICIAL".to_string()
}

fn default_weekly_tag() -> String {
    "WEEKLY".to_string()
}

fn default_security_tag() -> String {
    "SECURITY".to_string()
}

const DEFAULT_STORAGE_ROOT: &str = "/sdcard";

impl BuildConfig {
    /// Get the default build config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("opendelta").join("build.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.display().to_string(),
        })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "no build config, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load(),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is set but empty.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // OPENDELTA_STORAGE_ROOT
        if let Some(root) = env_path("OPENDELTA_STORAGE_ROOT")? {
            self.paths.storage_root = Some(root);
        }

        // OPENDELTA_PREFERENCES
        if let Some(prefs) = env_path("OPENDELTA_PREFERENCES")? {
            self.paths.preferences = Some(prefs);
        }

        // OPENDELTA_PROPS_FILE, colon separated like PATH
        if let Some(files) = std::env::var_os("OPENDELTA_PROPS_FILE") {
            let parsed: Vec<PathBuf> = std::env::split_paths(&files)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if parsed.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "OPENDELTA_PROPS_FILE".to_string(),
                    value: files.to_string_lossy().into_owned(),
                }
                .into());
            }
            self.paths.props_files = parsed;
        }

        Ok(())
    }

    /// Get the shared storage root (with default)
    #[must_use]
    pub fn storage_root(&self) -> PathBuf {
        self.paths
            .storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }

    /// Get the preferences file path (with default)
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the user data
    /// directory cannot be determined.
    pub fn preferences_path(&self) -> Result<PathBuf, Error> {
        if let Some(path) = &self.paths.preferences {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().ok_or_else(|| ConfigError::NotFound {
            path: "data directory".to_string(),
        })?;
        Ok(data_dir.join("opendelta").join("preferences.toml"))
    }

    /// Property source selected by this configuration: the configured
    /// property files when any are given, `getprop` otherwise.
    #[must_use]
    pub fn identity_source(&self) -> Arc<dyn IdentitySource> {
        if self.paths.props_files.is_empty() {
            Arc::new(GetpropSource::new())
        } else {
            Arc::new(PropFileSource::open(&self.paths.props_files))
        }
    }

    /// Release tags that classify a build as official
    pub fn official_tags(&self) -> impl Iterator<Item = &str> {
        [
            self.release.official.as_str(),
            self.release.weekly.as_str(),
            self.release.security.as_str(),
        ]
        .into_iter()
    }
}

fn env_path(var: &str) -> Result<Option<PathBuf>, Error> {
    match std::env::var_os(var) {
        None => Ok(None),
        Some(value) if value.is_empty() => Err(ConfigError::InvalidValue {
            field: var.to_string(),
            value: String::new(),
        }
        .into()),
        Some(value) => Ok(Some(PathBuf::from(value))),
    }
}
