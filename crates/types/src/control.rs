//! Identifiers for the settings controls whose availability is derived
//! from the current preferences

use serde::{Deserialize, Serialize};
use std::fmt;

/// A settings control (or group of controls) presented by a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Download options group: battery level, charge only, metered networks
    DownloadOptions,
    SchedulerMode,
    SchedulerDailyTime,
    SchedulerWeekDay,
    BatteryLevel,
    SecureMode,
    /// Only present on A/B devices
    AbPerfMode,
    /// Only present on A/B devices
    FileFlash,
}

impl Control {
    pub const ALL: [Control; 8] = [
        Control::DownloadOptions,
        Control::SchedulerMode,
        Control::SchedulerDailyTime,
        Control::SchedulerWeekDay,
        Control::BatteryLevel,
        Control::SecureMode,
        Control::AbPerfMode,
        Control::FileFlash,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::DownloadOptions => "category_download",
            Self::SchedulerMode => "scheduler_mode",
            Self::SchedulerDailyTime => "scheduler_daily_time",
            Self::SchedulerWeekDay => "scheduler_week_day",
            Self::BatteryLevel => "battery_level_string",
            Self::SecureMode => "secure_mode",
            Self::AbPerfMode => "ab_perf_mode",
            Self::FileFlash => "file_flash",
        }
    }

    /// Whether the control only exists on seamless-update devices
    #[must_use]
    pub fn requires_ab(self) -> bool {
        matches!(self, Self::AbPerfMode | Self::FileFlash)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Derived state of one control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub control: Control,
    pub enabled: bool,
}
