//! Integration tests for types

#[cfg(test)]
mod tests {
    use opendelta_types::*;

    #[test]
    fn test_enumerated_prefs_round_trip_through_store_form() {
        for level in [
            AutoDownload::Disabled,
            AutoDownload::Check,
            AutoDownload::Download,
        ] {
            assert_eq!(level.to_string().parse::<AutoDownload>().unwrap(), level);
        }
        assert!("3".parse::<AutoDownload>().is_err());
        assert!("weekly".parse::<SchedulerMode>().is_err());
        assert_eq!("2".parse::<SchedulerMode>().unwrap(), SchedulerMode::Weekly);
    }

    #[test]
    fn test_pref_value_untagged_serialization() {
        let json = serde_json::to_string(&PrefValue::Long(-1)).unwrap();
        assert_eq!(json, "-1");
        let value: PrefValue = serde_json::from_str("\"12:30\"").unwrap();
        assert_eq!(value.as_str(), Some("12:30"));
        let value: PrefValue = serde_json::from_str("true").unwrap();
        assert_eq!(value.as_bool(), Some(true));
        assert_eq!(value.as_long(), None);
    }

    #[test]
    fn test_daily_time_serializes_as_string() {
        let time = DailyTime::from_hm(21, 0).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), r#""21:00""#);
    }

    #[test]
    fn test_ab_only_controls() {
        let ab_only: Vec<_> = Control::ALL
            .iter()
            .filter(|control| control.requires_ab())
            .collect();
        assert_eq!(ab_only, [&Control::AbPerfMode, &Control::FileFlash]);
    }
}
