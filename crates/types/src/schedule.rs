//! Update scheduling and automatic download choices
//!
//! Every type here round-trips through the string form kept in the
//! preference store (`Display` writes it, `FromStr` reads it). Enumerated
//! values are stored as small integers so that list-style pickers can use
//! them directly as entry values.

use chrono::{NaiveTime, Timelike, Weekday};
use opendelta_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// How far the client goes on its own when a new build is published.
///
/// Ordered: a higher level is more automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoDownload {
    /// Never check in the background
    Disabled,
    /// Check and notify only
    Check,
    /// Download and prepare the update for flashing
    Download,
}

impl AutoDownload {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Check => "check only",
            Self::Download => "download and flash",
        }
    }
}

impl fmt::Display for AutoDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Disabled => "0",
            Self::Check => "1",
            Self::Download => "2",
        };
        f.write_str(code)
    }
}

impl FromStr for AutoDownload {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::Disabled),
            "1" => Ok(Self::Check),
            "2" => Ok(Self::Download),
            other => Err(invalid("auto_download", other)),
        }
    }
}

/// When background checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    /// Let the update engine pick its own time
    #[default]
    Smart,
    /// Once a day at the configured time
    Daily,
    /// Once a week on the configured weekday and time
    Weekly,
}

impl SchedulerMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for SchedulerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Smart => "0",
            Self::Daily => "1",
            Self::Weekly => "2",
        };
        f.write_str(code)
    }
}

impl FromStr for SchedulerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::Smart),
            "1" => Ok(Self::Daily),
            "2" => Ok(Self::Weekly),
            other => Err(invalid("scheduler_mode", other)),
        }
    }
}

/// Time of day for daily and weekly schedules, stored as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DailyTime(NaiveTime);

impl DailyTime {
    /// Build a time from hour and minute, `None` when out of range
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    #[must_use]
    pub fn as_naive(self) -> NaiveTime {
        self.0
    }
}

impl Default for DailyTime {
    fn default() -> Self {
        Self(NaiveTime::MIN)
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for DailyTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| invalid("scheduler_daily_time", s))
    }
}

impl From<DailyTime> for String {
    fn from(value: DailyTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DailyTime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Weekday for weekly schedules.
///
/// Stored as `1..=7` counting from Sunday, matching the calendar numbering
/// older clients wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ScheduleWeekday(Weekday);

impl ScheduleWeekday {
    #[must_use]
    pub fn new(day: Weekday) -> Self {
        Self(day)
    }

    #[must_use]
    pub fn weekday(self) -> Weekday {
        self.0
    }
}

impl Default for ScheduleWeekday {
    fn default() -> Self {
        Self(Weekday::Sun)
    }
}

impl fmt::Display for ScheduleWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.number_from_sunday())
    }
}

impl FromStr for ScheduleWeekday {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s
            .trim()
            .parse()
            .map_err(|_| invalid("scheduler_week_day", s))?;
        if !(1..=7).contains(&number) {
            return Err(invalid("scheduler_week_day", s));
        }
        // chrono numbers from Monday = 0
        Weekday::try_from((number + 5) % 7)
            .map(Self)
            .map_err(|_| invalid("scheduler_week_day", s))
    }
}

impl From<ScheduleWeekday> for String {
    fn from(value: ScheduleWeekday) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ScheduleWeekday {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Minimum battery percentage required before a background download starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    pub const DEFAULT_PERCENT: u8 = 50;

    /// Build a level, `None` above 100 percent
    #[must_use]
    pub fn new(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl Default for BatteryLevel {
    fn default() -> Self {
        Self(Self::DEFAULT_PERCENT)
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatteryLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| invalid("battery_level", s))
    }
}

impl From<BatteryLevel> for String {
    fn from(value: BatteryLevel) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BatteryLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_download_is_ordered() {
        assert!(AutoDownload::Disabled < AutoDownload::Check);
        assert!(AutoDownload::Check < AutoDownload::Download);
    }

    #[test]
    fn weekday_counts_from_sunday() {
        let sunday: ScheduleWeekday = "1".parse().unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        let saturday: ScheduleWeekday = "7".parse().unwrap();
        assert_eq!(saturday.weekday(), Weekday::Sat);
        assert_eq!(ScheduleWeekday::new(Weekday::Mon).to_string(), "2");
        assert!("0".parse::<ScheduleWeekday>().is_err());
        assert!("8".parse::<ScheduleWeekday>().is_err());
    }

    #[test]
    fn daily_time_is_zero_padded() {
        let time = DailyTime::from_hm(7, 5).unwrap();
        assert_eq!(time.to_string(), "07:05");
        assert_eq!("23:59".parse::<DailyTime>().unwrap().hour(), 23);
        assert!("24:00".parse::<DailyTime>().is_err());
        assert_eq!(DailyTime::default().to_string(), "00:00");
    }

    #[test]
    fn battery_level_bounds() {
        assert_eq!("30".parse::<BatteryLevel>().unwrap().percent(), 30);
        assert!("101".parse::<BatteryLevel>().is_err());
        assert!("-1".parse::<BatteryLevel>().is_err());
        assert_eq!(BatteryLevel::default().percent(), 50);
    }
}
