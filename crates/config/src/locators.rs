//! Device identity and locator resolution
//!
//! The resolver queries the property source exactly once and keeps the
//! result for as long as it lives. All locators are derived from the
//! identity and the templates alone, so resolving twice from the same
//! inputs gives byte-identical strings.

use opendelta_platform::IdentitySource;
use opendelta_types::DeviceIdentity;
use serde::Serialize;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Arc, OnceLock};

use crate::build_config::{BuildConfig, PropertyKeys, Templates};
use crate::keys::FLASH_AFTER_UPDATE_DIR;
use crate::template::{self, DEVICE, VERSION};

/// Every device- and version-dependent string handed to the update engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedLocators {
    /// File name stem of the installed build
    pub filename_base: String,
    /// File name stem shared by every build of the installed Android release
    pub filename_base_prefix: String,
    /// Storage directory, always ending in a separator
    pub path_base: String,
    /// Directory of extra zips flashed after an update, ending in a separator
    pub path_flash_after_update: String,
    pub url_base_delta: String,
    pub url_base_update: String,
    pub url_base_full: String,
    pub url_base_full_sum: String,
    pub url_base_json: String,
    pub url_suffix: String,
}

impl ResolvedLocators {
    /// Derive all locators from an identity.
    ///
    /// Each template is rendered from the identity directly; no locator is
    /// built from another locator's rendered value except the two storage
    /// paths, which are plain concatenations.
    #[must_use]
    pub fn derive(identity: &DeviceIdentity, templates: &Templates, storage_root: &Path) -> Self {
        let device = [(DEVICE, identity.property_device.as_str())];
        let url = |name: &str, text: &str| template::render(name, text, &device);

        let root = storage_root.display().to_string();
        let root = root.trim_end_matches(['/', MAIN_SEPARATOR]);
        let path_base = format!("{root}{MAIN_SEPARATOR}{}{MAIN_SEPARATOR}", templates.path_base);
        let path_flash_after_update =
            format!("{path_base}{FLASH_AFTER_UPDATE_DIR}{MAIN_SEPARATOR}");

        Self {
            filename_base: template::render(
                "filename_base",
                &templates.filename_base,
                &[(VERSION, identity.property_version.as_str())],
            ),
            filename_base_prefix: template::render(
                "filename_base",
                &templates.filename_base,
                &[(VERSION, identity.android_version.as_str())],
            ),
            path_base,
            path_flash_after_update,
            url_base_delta: url("url_base_delta", &templates.url_base_delta),
            url_base_update: url("url_base_update", &templates.url_base_update),
            url_base_full: url("url_base_full", &templates.url_base_full),
            url_base_full_sum: url("url_base_full_sum", &templates.url_base_full_sum),
            url_base_json: url("url_base_json", &templates.url_base_json),
            url_suffix: templates.url_suffix.clone(),
        }
    }

    /// Storage directory as a path
    #[must_use]
    pub fn path_base_dir(&self) -> &Path {
        Path::new(&self.path_base)
    }

    /// Flash-after-update directory as a path
    #[must_use]
    pub fn flash_after_update_dir(&self) -> &Path {
        Path::new(&self.path_flash_after_update)
    }
}

/// Read the device identity from a property source
#[must_use]
pub fn read_identity(source: &dyn IdentitySource, keys: &PropertyKeys) -> DeviceIdentity {
    let lookup = |key: &str| {
        let value = source.lookup(key);
        if value.is_empty() {
            tracing::debug!(source = source.name(), key, "property empty or unavailable");
        }
        value
    };

    DeviceIdentity {
        property_version: lookup(&keys.version),
        property_device: lookup(&keys.device),
        android_version: lookup(&keys.android_version),
        ab_update: DeviceIdentity::parse_bool_property(&lookup(&keys.ab_update)),
    }
}

/// Whether `device` is on the keep-screen-on allow-list.
///
/// A missing list means the image does not require it for any device.
#[must_use]
pub fn keep_screen_on(device: &str, allow_list: Option<&[String]>) -> bool {
    let Some(allow_list) = allow_list else {
        tracing::debug!("no keep_screen_on device list configured");
        return false;
    };
    !device.is_empty() && allow_list.iter().any(|entry| entry == device)
}

/// Result of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub identity: DeviceIdentity,
    pub locators: ResolvedLocators,
    pub keep_screen_on: bool,
}

/// Resolves identity and locators on first use and caches them
pub struct Resolver {
    source: Arc<dyn IdentitySource>,
    keys: PropertyKeys,
    templates: Templates,
    storage_root: PathBuf,
    keep_screen_on_devices: Option<Vec<String>>,
    resolved: OnceLock<Resolution>,
}

impl Resolver {
    #[must_use]
    pub fn new(source: Arc<dyn IdentitySource>, build: &BuildConfig) -> Self {
        Self {
            source,
            keys: build.properties.clone(),
            templates: build.templates.clone(),
            storage_root: build.storage_root(),
            keep_screen_on_devices: build.device.keep_screen_on.clone(),
            resolved: OnceLock::new(),
        }
    }

    /// Identity and locators, computed on the first call only
    pub fn resolve(&self) -> &Resolution {
        self.resolved.get_or_init(|| {
            let identity = read_identity(&*self.source, &self.keys);
            let locators = ResolvedLocators::derive(&identity, &self.templates, &self.storage_root);
            let keep_screen_on = keep_screen_on(
                &identity.property_device,
                self.keep_screen_on_devices.as_deref(),
            );

            tracing::debug!(
                source = self.source.name(),
                property_version = %identity.property_version,
                property_device = %identity.property_device,
                android_version = %identity.android_version,
                ab_update = identity.ab_update,
                "resolved device identity"
            );
            tracing::debug!(
                filename_base = %locators.filename_base,
                filename_base_prefix = %locators.filename_base_prefix,
                path_base = %locators.path_base,
                path_flash_after_update = %locators.path_flash_after_update,
                url_base_delta = %locators.url_base_delta,
                url_base_update = %locators.url_base_update,
                url_base_full = %locators.url_base_full,
                url_base_full_sum = %locators.url_base_full_sum,
                url_base_json = %locators.url_base_json,
                keep_screen_on,
                "resolved locators"
            );

            Resolution {
                identity,
                locators,
                keep_screen_on,
            }
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("source", &self.source.name())
            .field("resolved", &self.resolved.get().is_some())
            .finish_non_exhaustive()
    }
}
