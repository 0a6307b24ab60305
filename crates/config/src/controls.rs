//! Enable/disable state of the settings controls
//!
//! Front ends render whatever [`derive_controls`] returns and call it again
//! after every preference change; nothing here mutates any widget.

use opendelta_types::{AutoDownload, Control, ControlState, SchedulerMode};
use serde::Serialize;

use crate::preferences::PreferenceSnapshot;

/// Derived state of every control present on this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Controls(Vec<ControlState>);

impl Controls {
    /// `None` when the control does not exist on this device
    #[must_use]
    pub fn get(&self, control: Control) -> Option<bool> {
        self.0
            .iter()
            .find(|state| state.control == control)
            .map(|state| state.enabled)
    }

    #[must_use]
    pub fn is_enabled(&self, control: Control) -> bool {
        self.get(control).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlState> {
        self.0.iter()
    }
}

impl IntoIterator for Controls {
    type Item = ControlState;
    type IntoIter = std::vec::IntoIter<ControlState>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Compute the `(control, enabled)` pairs for a preference snapshot.
///
/// Controls that only exist on A/B devices are left out when `ab_device`
/// is false. Order follows [`Control::ALL`].
#[must_use]
pub fn derive_controls(
    prefs: &PreferenceSnapshot,
    secure_mode_available: bool,
    ab_device: bool,
) -> Controls {
    let states = Control::ALL
        .into_iter()
        .filter(|control| ab_device || !control.requires_ab())
        .map(|control| {
            let enabled = match control {
                Control::DownloadOptions => prefs.auto_download > AutoDownload::Check,
                Control::SchedulerMode => prefs.auto_download > AutoDownload::Disabled,
                Control::SchedulerDailyTime => prefs.scheduler_mode != SchedulerMode::Smart,
                Control::SchedulerWeekDay => prefs.scheduler_mode == SchedulerMode::Weekly,
                Control::BatteryLevel => !prefs.charge_only,
                Control::SecureMode => secure_mode_available,
                Control::AbPerfMode | Control::FileFlash => true,
            };
            ControlState { control, enabled }
        })
        .collect();
    Controls(states)
}
