//! Typed access to the user's update preferences
//!
//! Nothing is cached here: every getter reads the store and substitutes
//! the documented default when the key is absent. A stored value of the
//! wrong type, or one outside its enumerated set (for example written by a
//! newer client before a downgrade), is logged and treated as absent.

use opendelta_errors::{ConfigError, Error};
use opendelta_store::{PrefEdit, PreferenceStore};
use opendelta_types::{
    AutoDownload, BatteryLevel, DailyTime, PrefValue, ScheduleWeekday, SchedulerMode,
};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::keys;

pub const AB_PERF_MODE_DEFAULT: bool = true;
pub const SHOW_INFO_DEFAULT: bool = true;
pub const CHARGE_ONLY_DEFAULT: bool = true;
pub const METERED_NETWORKS_DEFAULT: bool = false;
pub const FILE_FLASH_DEFAULT: bool = false;

/// All user preferences at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceSnapshot {
    pub auto_download: AutoDownload,
    pub battery_level: BatteryLevel,
    pub charge_only: bool,
    pub scheduler_mode: SchedulerMode,
    pub scheduler_daily_time: DailyTime,
    pub scheduler_week_day: ScheduleWeekday,
    pub ab_perf_mode: bool,
    pub metered_networks: bool,
    pub show_info: bool,
    pub file_flash: bool,
    pub shown_recovery_warning_secure: bool,
    pub shown_recovery_warning_not_secure: bool,
    pub file_flash_hint_shown: bool,
    pub start_hint_shown: bool,
}

/// Download bookkeeping written by the update engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadState {
    pub latest_full_name: Option<String>,
    pub latest_delta_name: Option<String>,
    pub ready_filename: Option<String>,
    pub download_size: i64,
    pub delta_signature: bool,
    pub initial_file: Option<String>,
}

/// Typed front for the preference store
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    official_build: bool,
}

impl Preferences {
    /// `official_build` selects the auto-download default
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>, official_build: bool) -> Self {
        Self {
            store,
            official_build,
        }
    }

    /// Underlying store, shared with the security policy
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        match self.store.get(key) {
            None => default,
            Some(PrefValue::Bool(value)) => value,
            Some(other) => {
                tracing::warn!(key, kind = other.kind(), "expected a boolean preference, using default");
                default
            }
        }
    }

    fn read_string(&self, key: &str) -> Option<String> {
        match self.store.get(key)? {
            PrefValue::String(value) => Some(value),
            other => {
                tracing::warn!(key, kind = other.kind(), "expected a string preference, ignoring");
                None
            }
        }
    }

    fn read_parsed<T: FromStr + Display>(&self, key: &str, default: T) -> T {
        let raw = match self.store.get(key) {
            None => return default,
            Some(PrefValue::String(value)) => value,
            Some(PrefValue::Long(value)) => value.to_string(),
            Some(PrefValue::Bool(_)) => {
                tracing::warn!(key, "expected a string preference, using default");
                return default;
            }
        };
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "unrecognized stored value, using default");
            default
        })
    }

    fn write(&self, key: &str, value: impl Into<PrefValue>) -> Result<(), Error> {
        let value = value.into();
        tracing::debug!(key, value = %value, "preference updated");
        self.store.put(key, value)
    }

    /// Auto-download level used until the user picks one: builds published
    /// by the project check for updates, custom builds never do.
    #[must_use]
    pub fn default_auto_download(&self) -> AutoDownload {
        if self.official_build {
            AutoDownload::Check
        } else {
            AutoDownload::Disabled
        }
    }

    #[must_use]
    pub fn auto_download(&self) -> AutoDownload {
        self.read_parsed(keys::AUTO_DOWNLOAD, self.default_auto_download())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_auto_download(&self, level: AutoDownload) -> Result<(), Error> {
        self.write(keys::AUTO_DOWNLOAD, level.to_string())
    }

    #[must_use]
    pub fn battery_level(&self) -> BatteryLevel {
        self.read_parsed(keys::BATTERY_LEVEL, BatteryLevel::default())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_battery_level(&self, level: BatteryLevel) -> Result<(), Error> {
        self.write(keys::BATTERY_LEVEL, level.to_string())
    }

    #[must_use]
    pub fn charge_only(&self) -> bool {
        self.read_bool(keys::CHARGE_ONLY, CHARGE_ONLY_DEFAULT)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_charge_only(&self, enable: bool) -> Result<(), Error> {
        self.write(keys::CHARGE_ONLY, enable)
    }

    #[must_use]
    pub fn scheduler_mode(&self) -> SchedulerMode {
        self.read_parsed(keys::SCHEDULER_MODE, SchedulerMode::default())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_scheduler_mode(&self, mode: SchedulerMode) -> Result<(), Error> {
        self.write(keys::SCHEDULER_MODE, mode.to_string())
    }

    #[must_use]
    pub fn scheduler_daily_time(&self) -> DailyTime {
        self.read_parsed(keys::SCHEDULER_DAILY_TIME, DailyTime::default())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_scheduler_daily_time(&self, time: DailyTime) -> Result<(), Error> {
        self.write(keys::SCHEDULER_DAILY_TIME, time.to_string())
    }

    #[must_use]
    pub fn scheduler_week_day(&self) -> ScheduleWeekday {
        self.read_parsed(keys::SCHEDULER_WEEK_DAY, ScheduleWeekday::default())
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_scheduler_week_day(&self, day: ScheduleWeekday) -> Result<(), Error> {
        self.write(keys::SCHEDULER_WEEK_DAY, day.to_string())
    }

    #[must_use]
    pub fn ab_perf_mode(&self) -> bool {
        self.read_bool(keys::AB_PERF_MODE, AB_PERF_MODE_DEFAULT)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_ab_perf_mode(&self, enable: bool) -> Result<(), Error> {
        self.write(keys::AB_PERF_MODE, enable)
    }

    #[must_use]
    pub fn metered_networks(&self) -> bool {
        self.read_bool(keys::METERED_NETWORKS, METERED_NETWORKS_DEFAULT)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_metered_networks(&self, allow: bool) -> Result<(), Error> {
        self.write(keys::METERED_NETWORKS, allow)
    }

    #[must_use]
    pub fn show_info(&self) -> bool {
        self.read_bool(keys::SHOW_INFO, SHOW_INFO_DEFAULT)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_show_info(&self, enable: bool) -> Result<(), Error> {
        self.write(keys::SHOW_INFO, enable)
    }

    #[must_use]
    pub fn file_flash(&self) -> bool {
        self.read_bool(keys::FILE_FLASH, FILE_FLASH_DEFAULT)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_file_flash(&self, enable: bool) -> Result<(), Error> {
        self.write(keys::FILE_FLASH, enable)
    }

    #[must_use]
    pub fn shown_recovery_warning_secure(&self) -> bool {
        self.read_bool(keys::SHOWN_RECOVERY_WARNING_SECURE, false)
    }

    /// Record that the secure-mode recovery warning was shown. There is no
    /// way back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_shown_recovery_warning_secure(&self) -> Result<(), Error> {
        self.write(keys::SHOWN_RECOVERY_WARNING_SECURE, true)
    }

    #[must_use]
    pub fn shown_recovery_warning_not_secure(&self) -> bool {
        self.read_bool(keys::SHOWN_RECOVERY_WARNING_NOT_SECURE, false)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_shown_recovery_warning_not_secure(&self) -> Result<(), Error> {
        self.write(keys::SHOWN_RECOVERY_WARNING_NOT_SECURE, true)
    }

    #[must_use]
    pub fn file_flash_hint_shown(&self) -> bool {
        self.read_bool(keys::FILE_FLASH_HINT_SHOWN, false)
    }

    /// Mark the file-flash hint as seen. Returns `true` when this is the
    /// first time, i.e. the caller should display the hint now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn acknowledge_file_flash_hint(&self) -> Result<bool, Error> {
        let first_time = !self.file_flash_hint_shown();
        self.write(keys::FILE_FLASH_HINT_SHOWN, true)?;
        Ok(first_time)
    }

    #[must_use]
    pub fn start_hint_shown(&self) -> bool {
        self.read_bool(keys::START_HINT_SHOWN, false)
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn set_start_hint_shown(&self, shown: bool) -> Result<(), Error> {
        self.write(keys::START_HINT_SHOWN, shown)
    }

    /// Read every preference at once
    #[must_use]
    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            auto_download: self.auto_download(),
            battery_level: self.battery_level(),
            charge_only: self.charge_only(),
            scheduler_mode: self.scheduler_mode(),
            scheduler_daily_time: self.scheduler_daily_time(),
            scheduler_week_day: self.scheduler_week_day(),
            ab_perf_mode: self.ab_perf_mode(),
            metered_networks: self.metered_networks(),
            show_info: self.show_info(),
            file_flash: self.file_flash(),
            shown_recovery_warning_secure: self.shown_recovery_warning_secure(),
            shown_recovery_warning_not_secure: self.shown_recovery_warning_not_secure(),
            file_flash_hint_shown: self.file_flash_hint_shown(),
            start_hint_shown: self.start_hint_shown(),
        }
    }

    #[must_use]
    pub fn download_state(&self) -> DownloadState {
        let download_size = match self.store.get(keys::DOWNLOAD_SIZE) {
            Some(PrefValue::Long(size)) => size,
            _ => keys::DOWNLOAD_SIZE_UNKNOWN,
        };
        DownloadState {
            latest_full_name: self.read_string(keys::LATEST_FULL_NAME),
            latest_delta_name: self.read_string(keys::LATEST_DELTA_NAME),
            ready_filename: self.read_string(keys::READY_FILENAME),
            download_size,
            delta_signature: self.read_bool(keys::DELTA_SIGNATURE, false),
            initial_file: self.read_string(keys::INITIAL_FILE),
        }
    }

    /// Reset everything the update engine derived from past downloads
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the batch.
    pub fn clear_download_state(&self) -> Result<(), Error> {
        tracing::info!("clearing download state");
        self.store.apply(&[
            PrefEdit::remove(keys::LATEST_FULL_NAME),
            PrefEdit::remove(keys::LATEST_DELTA_NAME),
            PrefEdit::remove(keys::READY_FILENAME),
            PrefEdit::put(keys::DOWNLOAD_SIZE, keys::DOWNLOAD_SIZE_UNKNOWN),
            PrefEdit::put(keys::DELTA_SIGNATURE, false),
            PrefEdit::remove(keys::INITIAL_FILE),
        ])
    }

    /// Set a user-adjustable preference from its textual form, as typed on
    /// a command line. One-time hint flags and secure mode are not
    /// accepted here.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key, an unparseable value, or a
    /// failed write.
    pub fn set_from_str(&self, key: &str, raw: &str) -> Result<(), Error> {
        match key {
            keys::AUTO_DOWNLOAD => self.set_auto_download(raw.parse()?),
            keys::BATTERY_LEVEL => self.set_battery_level(raw.parse()?),
            keys::CHARGE_ONLY => self.set_charge_only(parse_flag(key, raw)?),
            keys::SCHEDULER_MODE => self.set_scheduler_mode(raw.parse()?),
            keys::SCHEDULER_DAILY_TIME => self.set_scheduler_daily_time(raw.parse()?),
            keys::SCHEDULER_WEEK_DAY => self.set_scheduler_week_day(raw.parse()?),
            keys::AB_PERF_MODE => self.set_ab_perf_mode(parse_flag(key, raw)?),
            keys::METERED_NETWORKS => self.set_metered_networks(parse_flag(key, raw)?),
            keys::SHOW_INFO => self.set_show_info(parse_flag(key, raw)?),
            keys::FILE_FLASH => self.set_file_flash(parse_flag(key, raw)?),
            _ => Err(ConfigError::UnknownPreference {
                key: key.to_string(),
            }
            .into()),
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("official_build", &self.official_build)
            .finish_non_exhaustive()
    }
}

/// Parse a boolean preference value as typed by a user.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for anything other than
/// true/false, 1/0, on/off or yes/no.
pub fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendelta_store::MemoryStore;

    fn prefs(official: bool) -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone(), official);
        (store, prefs)
    }

    #[test]
    fn defaults_without_stored_values() {
        let (store, prefs) = prefs(false);
        let snapshot = prefs.snapshot();
        assert_eq!(snapshot.auto_download, AutoDownload::Disabled);
        assert_eq!(snapshot.battery_level.percent(), 50);
        assert!(snapshot.charge_only);
        assert_eq!(snapshot.scheduler_mode, SchedulerMode::Smart);
        assert_eq!(snapshot.scheduler_daily_time.to_string(), "00:00");
        assert_eq!(snapshot.scheduler_week_day.to_string(), "1");
        assert!(snapshot.ab_perf_mode);
        assert!(!snapshot.metered_networks);
        assert!(snapshot.show_info);
        assert!(!snapshot.file_flash);
        assert!(!snapshot.shown_recovery_warning_secure);
        // Reading never writes
        assert!(store.entries().is_empty());
    }

    #[test]
    fn official_builds_check_by_default() {
        let (_, prefs) = prefs(true);
        assert_eq!(prefs.auto_download(), AutoDownload::Check);
        prefs.set_auto_download(AutoDownload::Download).unwrap();
        assert_eq!(prefs.auto_download(), AutoDownload::Download);
    }

    #[test]
    fn out_of_range_values_fall_back_to_default() {
        let (store, prefs) = prefs(true);
        store.put(keys::AUTO_DOWNLOAD, PrefValue::from("3")).unwrap();
        store.put(keys::SCHEDULER_MODE, PrefValue::from("hourly")).unwrap();
        store.put(keys::SHOW_INFO, PrefValue::from("no")).unwrap();
        store.put(keys::SCHEDULER_WEEK_DAY, PrefValue::Long(3)).unwrap();

        assert_eq!(prefs.auto_download(), AutoDownload::Check);
        assert_eq!(prefs.scheduler_mode(), SchedulerMode::Smart);
        assert!(prefs.show_info());
        assert_eq!(prefs.scheduler_week_day().to_string(), "3");
    }

    #[test]
    fn one_time_flags() {
        let (_, prefs) = prefs(false);
        assert!(prefs.acknowledge_file_flash_hint().unwrap());
        assert!(!prefs.acknowledge_file_flash_hint().unwrap());
        assert!(prefs.file_flash_hint_shown());

        prefs.set_shown_recovery_warning_not_secure().unwrap();
        assert!(prefs.shown_recovery_warning_not_secure());
        assert!(!prefs.shown_recovery_warning_secure());
    }

    #[test]
    fn clear_download_state_resets_the_fixed_subset() {
        let (store, prefs) = prefs(false);
        store
            .apply(&[
                PrefEdit::put(keys::LATEST_FULL_NAME, "omni-13-full.zip"),
                PrefEdit::put(keys::LATEST_DELTA_NAME, "omni-13.delta"),
                PrefEdit::put(keys::READY_FILENAME, "/sdcard/OpenDelta/omni-13.zip"),
                PrefEdit::put(keys::DOWNLOAD_SIZE, 1_234_567_i64),
                PrefEdit::put(keys::DELTA_SIGNATURE, true),
                PrefEdit::put(keys::INITIAL_FILE, "omni-13-initial.zip"),
                PrefEdit::put(keys::SHOW_INFO, false),
            ])
            .unwrap();
        assert_eq!(prefs.download_state().download_size, 1_234_567);

        prefs.clear_download_state().unwrap();
        assert_eq!(
            prefs.download_state(),
            DownloadState {
                latest_full_name: None,
                latest_delta_name: None,
                ready_filename: None,
                download_size: -1,
                delta_signature: false,
                initial_file: None,
            }
        );
        assert!(!prefs.show_info());
    }

    #[test]
    fn set_from_str_validates() {
        let (_, prefs) = prefs(false);
        prefs.set_from_str(keys::SCHEDULER_MODE, "2").unwrap();
        prefs.set_from_str(keys::CHARGE_ONLY, "off").unwrap();
        prefs.set_from_str(keys::SCHEDULER_DAILY_TIME, "04:15").unwrap();
        assert_eq!(prefs.scheduler_mode(), SchedulerMode::Weekly);
        assert!(!prefs.charge_only());
        assert_eq!(prefs.scheduler_daily_time().to_string(), "04:15");

        assert!(matches!(
            prefs.set_from_str(keys::BATTERY_LEVEL, "150"),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            prefs.set_from_str(keys::SHOWN_RECOVERY_WARNING_SECURE, "true"),
            Err(Error::Config(ConfigError::UnknownPreference { .. }))
        ));
    }
}
