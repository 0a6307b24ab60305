#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the OpenDelta configuration core
//!
//! This crate provides the value types shared by the resolver, the
//! preference layer and the command line front end: device identity,
//! scheduling choices, raw preference values and UI control identifiers.

pub mod control;
pub mod identity;
pub mod schedule;
pub mod value;

// Re-export commonly used types
pub use control::{Control, ControlState};
pub use identity::DeviceIdentity;
pub use schedule::{AutoDownload, BatteryLevel, DailyTime, ScheduleWeekday, SchedulerMode};
pub use value::PrefValue;

use serde::{Deserialize, Serialize};

/// On/off switch accepted by boolean command line toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl std::fmt::Display for Toggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

// Implement clap::ValueEnum for Toggle
impl clap::ValueEnum for Toggle {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::On, Self::Off]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::On => clap::builder::PossibleValue::new("on").alias("true"),
            Self::Off => clap::builder::PossibleValue::new("off").alias("false"),
        })
    }
}
