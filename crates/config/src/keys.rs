//! Names of the keys kept in the preference store
//!
//! These names are shared with the update engine, which reads the same
//! store. Renaming any of them silently resets the user's choice.

pub const SECURE_MODE: &str = "secure_mode";
pub const SHOWN_RECOVERY_WARNING_SECURE: &str = "shown_recovery_warning_secure";
pub const SHOWN_RECOVERY_WARNING_NOT_SECURE: &str = "shown_recovery_warning_not_secure";
pub const SHOW_INFO: &str = "show_info";
pub const AB_PERF_MODE: &str = "ab_perf_mode";

pub const AUTO_DOWNLOAD: &str = "auto_download_actions";
pub const BATTERY_LEVEL: &str = "battery_level_string";
pub const CHARGE_ONLY: &str = "charge_only";
pub const SCHEDULER_MODE: &str = "scheduler_mode";
pub const SCHEDULER_DAILY_TIME: &str = "scheduler_daily_time";
pub const SCHEDULER_WEEK_DAY: &str = "scheduler_week_day";
pub const METERED_NETWORKS: &str = "auto_update_metered_networks";
pub const FILE_FLASH: &str = "file_flash";
pub const FILE_FLASH_HINT_SHOWN: &str = "file_flash_hint_shown";
pub const START_HINT_SHOWN: &str = "start_hint_shown";

// Download state owned by the update engine
pub const LATEST_FULL_NAME: &str = "latest_full_name";
pub const LATEST_DELTA_NAME: &str = "latest_delta_name";
pub const READY_FILENAME: &str = "ready_filename";
pub const DOWNLOAD_SIZE: &str = "download_size_long";
pub const DELTA_SIGNATURE: &str = "delta_signature";
pub const INITIAL_FILE: &str = "initial_file";

/// Subdirectory of the storage base holding extra zips flashed after an update
pub const FLASH_AFTER_UPDATE_DIR: &str = "FlashAfterUpdate";

/// Value of `download_size_long` when no download is known
pub const DOWNLOAD_SIZE_UNKNOWN: i64 = -1;
