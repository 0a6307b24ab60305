#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration core for the OpenDelta update client
//!
//! This crate turns device identity and build resources into the values
//! the update engine runs on:
//! - Resolved locators (file names, storage paths, download URLs)
//! - The effective secure-mode policy
//! - Typed user preferences and the controls they enable
//! - Maintenance of the managed storage directory
//!
//! A [`Config`] is built once at startup and shared by reference.

pub mod build_config;
pub mod controls;
pub mod keys;
pub mod locators;
pub mod maintenance;
pub mod preferences;
pub mod security;
mod template;

pub use build_config::{BuildConfig, DeviceConfig, PathConfig, PropertyKeys, ReleaseTags, Templates};
pub use controls::{derive_controls, Controls};
pub use locators::{Resolution, ResolvedLocators, Resolver};
pub use preferences::{parse_flag, DownloadState, PreferenceSnapshot, Preferences};
pub use security::{SecurityCapability, SecurityPolicy, SecuritySummary};

use opendelta_errors::Error;
use opendelta_platform::Platform;
use opendelta_store::{FileStore, PreferenceStore};
use opendelta_types::DeviceIdentity;
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime configuration shared by every component of the client
pub struct Config {
    build: BuildConfig,
    platform: Platform,
    resolver: Resolver,
    security: SecurityPolicy,
    preferences: Preferences,
}

impl Config {
    /// Assemble the configuration and resolve the device identity.
    ///
    /// The property source of `platform` is queried here, once.
    #[must_use]
    pub fn new(build: BuildConfig, platform: Platform, store: Arc<dyn PreferenceStore>) -> Self {
        let resolver = Resolver::new(platform.shared_identity(), &build);
        let official = resolver
            .resolve()
            .identity
            .has_any_tag(build.official_tags());
        let security = SecurityPolicy::new(build.signature.clone(), Arc::clone(&store));
        let preferences = Preferences::new(store, official);

        tracing::info!(
            device = %resolver.resolve().identity.property_device,
            official,
            secure_mode_available = security.effective_capability(),
            "configuration ready"
        );

        Self {
            build,
            platform,
            resolver,
            security,
            preferences,
        }
    }

    /// Configuration for the running device: the property source selected
    /// by `build`, the local filesystem and the file-backed preference store.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences path cannot be determined or the
    /// preferences file exists but cannot be read.
    pub fn open(build: BuildConfig) -> Result<Self, Error> {
        let platform = Platform::current().with_identity(build.identity_source());
        let store = FileStore::open(build.preferences_path()?)?;
        Ok(Self::new(build, platform, Arc::new(store)))
    }

    #[must_use]
    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    #[must_use]
    pub fn resolution(&self) -> &Resolution {
        self.resolver.resolve()
    }

    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.resolution().identity
    }

    #[must_use]
    pub fn locators(&self) -> &ResolvedLocators {
        &self.resolution().locators
    }

    #[must_use]
    pub fn keep_screen_on(&self) -> bool {
        self.resolution().keep_screen_on
    }

    #[must_use]
    pub fn is_ab_device(&self) -> bool {
        self.identity().ab_update
    }

    /// Whether the installed build carries one of the release tags
    #[must_use]
    pub fn is_official_version(&self) -> bool {
        self.identity().has_any_tag(self.build.official_tags())
    }

    #[must_use]
    pub fn security(&self) -> &SecurityPolicy {
        &self.security
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Current enable state of every control on this device
    #[must_use]
    pub fn controls(&self) -> Controls {
        derive_controls(
            &self.preferences.snapshot(),
            self.security.effective_capability(),
            self.is_ab_device(),
        )
    }

    /// Zips queued for flashing after the next update
    #[must_use]
    pub fn flash_after_update_zips(&self) -> Vec<PathBuf> {
        maintenance::flash_after_update_zips(self.platform.filesystem(), self.locators())
    }

    /// Delete downloaded files of the installed Android release and forget
    /// the download state. Returns the number of files deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store rejects the reset. Files
    /// are deleted before the store is touched.
    pub fn clean_files(&self) -> Result<usize, Error> {
        let deleted = maintenance::clean_prefixed_files(self.platform.filesystem(), self.locators());
        self.preferences.clear_download_state()?;
        self.preferences.set_start_hint_shown(false)?;
        Ok(deleted)
    }

    /// Set a preference from its textual form. Secure mode goes through the
    /// security policy and is clamped by the build capability.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key, an invalid value or a failed
    /// write.
    pub fn set_preference(&self, key: &str, value: &str) -> Result<(), Error> {
        if key == keys::SECURE_MODE {
            let requested = preferences::parse_flag(key, value)?;
            let effective = self.security.set_policy(requested)?;
            tracing::debug!(requested, effective, "secure mode updated");
            return Ok(());
        }
        self.preferences.set_from_str(key, value)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("platform", &self.platform)
            .field("resolver", &self.resolver)
            .field("security", &self.security)
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}
