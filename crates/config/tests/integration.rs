//! Integration tests for config

#[cfg(test)]
mod tests {
    use opendelta_config::*;
    use opendelta_platform::{IdentitySource, Platform, StaticSource, StdFilesystem};
    use opendelta_store::{MemoryStore, PreferenceStore};
    use opendelta_types::{AutoDownload, Control, PrefValue, SchedulerMode};
    use proptest::prelude::*;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::{NamedTempFile, TempDir};

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn props(version: &str, ab: bool) -> StaticSource {
        StaticSource::new()
            .with("ro.omni.version", version)
            .with("ro.omni.device", "guacamole")
            .with("ro.build.version.release", "13")
            .with("ro.build.ab_update", if ab { "true" } else { "false" })
    }

    fn config_at(root: &Path, source: StaticSource) -> (Config, Arc<MemoryStore>) {
        let mut build = BuildConfig::default();
        build.paths.storage_root = Some(root.to_path_buf());
        let platform = Platform::new(Arc::new(source), Arc::new(StdFilesystem::new()));
        let store = Arc::new(MemoryStore::new());
        (Config::new(build, platform, store.clone()), store)
    }

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_load_build_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[templates]
filename_base = "lineage-{{version}}"
url_base_delta = "https://mirror.example/{{device}}/delta/"

[signature]
secure_mode_enable = false

[device]
keep_screen_on = ["guacamole"]
        "#
        )
        .unwrap();

        let build = BuildConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(build.templates.filename_base, "lineage-{version}");
        assert_eq!(build.templates.path_base, "OpenDelta");
        assert!(!build.signature.secure_mode_enable);
        assert!(build.signature.apply_signature);
        assert_eq!(build.properties.device, "ro.omni.device");
        assert_eq!(
            build.device.keep_screen_on.as_deref(),
            Some(&["guacamole".to_string()][..])
        );
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[templates\nfilename_base = 1").unwrap();
        let err = BuildConfig::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(
            err,
            opendelta_errors::Error::Config(opendelta_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("OPENDELTA_STORAGE_ROOT");
        std::env::remove_var("OPENDELTA_PREFERENCES");
        std::env::remove_var("OPENDELTA_PROPS_FILE");

        std::env::set_var("OPENDELTA_STORAGE_ROOT", "/mnt/media_rw/sdcard1");
        std::env::set_var("OPENDELTA_PREFERENCES", "/data/opendelta/prefs.toml");
        let joined = std::env::join_paths(["/system/build.prop", "/vendor/build.prop"]).unwrap();
        std::env::set_var("OPENDELTA_PROPS_FILE", &joined);

        let mut build = BuildConfig::default();
        build.merge_env().unwrap();

        assert_eq!(build.storage_root(), PathBuf::from("/mnt/media_rw/sdcard1"));
        assert_eq!(
            build.preferences_path().unwrap(),
            PathBuf::from("/data/opendelta/prefs.toml")
        );
        assert_eq!(build.paths.props_files.len(), 2);

        std::env::set_var("OPENDELTA_STORAGE_ROOT", "");
        assert!(BuildConfig::default().merge_env().is_err());

        std::env::remove_var("OPENDELTA_STORAGE_ROOT");
        std::env::remove_var("OPENDELTA_PREFERENCES");
        std::env::remove_var("OPENDELTA_PROPS_FILE");
    }

    #[test]
    fn test_props_file_identity_source() {
        let dir = TempDir::new().unwrap();
        let props = dir.path().join("build.prop");
        fs::write(
            &props,
            "# begin build properties\nro.omni.version=13-20240101-guacamole-OFFICIAL\nro.omni.device=guacamole\nro.build.version.release=13\n",
        )
        .unwrap();

        let mut build = BuildConfig::default();
        build.paths.props_files = vec![props];
        let source = build.identity_source();
        assert_eq!(source.lookup("ro.omni.device"), "guacamole");
        assert_eq!(source.lookup("ro.build.ab_update"), "");
    }

    #[test]
    fn test_official_builds_default_to_check() {
        let dir = TempDir::new().unwrap();
        for version in [
            "13-20240101-guacamole-OFFICIAL",
            "13-20240101-guacamole-WEEKLY",
            "13-20240101-guacamole-SECURITY",
        ] {
            let (config, _) = config_at(dir.path(), props(version, false));
            assert!(config.is_official_version(), "{version}");
            assert_eq!(config.preferences().auto_download(), AutoDownload::Check);
        }

        let (config, _) = config_at(dir.path(), props("13-20240101-guacamole-HOMEMADE", false));
        assert!(!config.is_official_version());
        assert_eq!(config.preferences().auto_download(), AutoDownload::Disabled);
    }

    #[test]
    fn test_scheduler_mode_controls() {
        let dir = TempDir::new().unwrap();
        let (config, _) = config_at(dir.path(), props("13-OFFICIAL", true));
        let prefs = config.preferences();

        prefs.set_scheduler_mode(SchedulerMode::Weekly).unwrap();
        let controls = config.controls();
        assert!(controls.is_enabled(Control::SchedulerWeekDay));
        assert!(controls.is_enabled(Control::SchedulerDailyTime));

        prefs.set_scheduler_mode(SchedulerMode::Daily).unwrap();
        let controls = config.controls();
        assert!(!controls.is_enabled(Control::SchedulerWeekDay));
        assert!(controls.is_enabled(Control::SchedulerDailyTime));

        prefs.set_scheduler_mode(SchedulerMode::Smart).unwrap();
        let controls = config.controls();
        assert!(!controls.is_enabled(Control::SchedulerWeekDay));
        assert!(!controls.is_enabled(Control::SchedulerDailyTime));
    }

    #[test]
    fn test_auto_download_and_charge_controls() {
        let dir = TempDir::new().unwrap();
        let (config, _) = config_at(dir.path(), props("13-HOMEMADE", false));
        let prefs = config.preferences();

        let controls = config.controls();
        assert!(!controls.is_enabled(Control::DownloadOptions));
        assert!(!controls.is_enabled(Control::SchedulerMode));
        assert!(!controls.is_enabled(Control::BatteryLevel));

        prefs.set_auto_download(AutoDownload::Check).unwrap();
        let controls = config.controls();
        assert!(!controls.is_enabled(Control::DownloadOptions));
        assert!(controls.is_enabled(Control::SchedulerMode));

        prefs.set_auto_download(AutoDownload::Download).unwrap();
        prefs.set_charge_only(false).unwrap();
        let controls = config.controls();
        assert!(controls.is_enabled(Control::DownloadOptions));
        assert!(controls.is_enabled(Control::BatteryLevel));
    }

    #[test]
    fn test_ab_controls_only_on_ab_devices() {
        let dir = TempDir::new().unwrap();
        let (ab, _) = config_at(dir.path(), props("13", true));
        let (legacy, _) = config_at(dir.path(), props("13", false));

        assert!(ab.is_ab_device());
        assert_eq!(ab.controls().get(Control::FileFlash), Some(true));
        assert_eq!(ab.controls().get(Control::AbPerfMode), Some(true));
        assert_eq!(legacy.controls().get(Control::FileFlash), None);
        assert_eq!(legacy.controls().iter().count(), 6);
    }

    #[test]
    fn test_secure_mode_through_set_preference() {
        let dir = TempDir::new().unwrap();
        let (config, store) = config_at(dir.path(), props("13", false));
        assert!(config.controls().is_enabled(Control::SecureMode));

        config.set_preference(keys::SECURE_MODE, "on").unwrap();
        assert!(config.security().current_policy());
        config.set_preference(keys::SECURE_MODE, "off").unwrap();
        assert!(!config.security().current_policy());
        assert_eq!(store.get(keys::SECURE_MODE), Some(PrefValue::Bool(false)));

        assert!(config.set_preference(keys::SECURE_MODE, "maybe").is_err());
        assert!(config.set_preference("no_such_key", "1").is_err());
    }

    #[test]
    fn test_flash_after_update_listing() {
        let dir = TempDir::new().unwrap();
        let (config, _) = config_at(dir.path(), props("13", true));
        let flash_dir = config.locators().flash_after_update_dir().to_path_buf();

        // Missing directory is not an error
        assert!(config.flash_after_update_zips().is_empty());

        fs::create_dir_all(&flash_dir).unwrap();
        touch(&flash_dir.join("UPDATE.ZIP"));
        touch(&flash_dir.join("a-gapps.zip"));
        touch(&flash_dir.join("update.txt"));
        fs::create_dir(flash_dir.join("folder.zip")).unwrap();

        let zips = config.flash_after_update_zips();
        let names: Vec<_> = zips
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["UPDATE.ZIP", "a-gapps.zip"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_flash_listing_drops_symlink_escapes() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let (config, _) = config_at(dir.path(), props("13", true));
        let flash_dir = config.locators().flash_after_update_dir().to_path_buf();
        fs::create_dir_all(&flash_dir).unwrap();

        let escaped = outside.path().join("evil.zip");
        touch(&escaped);
        std::os::unix::fs::symlink(&escaped, flash_dir.join("evil.zip")).unwrap();
        let inside = config.locators().path_base_dir().join("kept.zip");
        touch(&inside);
        std::os::unix::fs::symlink(&inside, flash_dir.join("linked.zip")).unwrap();

        let zips = config.flash_after_update_zips();
        assert_eq!(zips.len(), 1);
        assert!(zips[0].ends_with("kept.zip"));
    }

    #[test]
    fn test_clean_files() {
        let dir = TempDir::new().unwrap();
        let (config, store) = config_at(dir.path(), props("13-20240101-guacamole-WEEKLY", false));
        let base = config.locators().path_base_dir().to_path_buf();
        fs::create_dir_all(&base).unwrap();

        for name in ["omni-13-a.zip", "omni-13-b.delta", "omni-13"] {
            touch(&base.join(name));
        }
        for name in ["omni-12-old.zip", "notes.txt"] {
            touch(&base.join(name));
        }
        fs::create_dir(base.join("omni-13-dir")).unwrap();

        store
            .put(keys::LATEST_FULL_NAME, PrefValue::from("omni-13-a.zip"))
            .unwrap();
        config.preferences().set_start_hint_shown(true).unwrap();

        assert_eq!(config.clean_files().unwrap(), 3);
        assert!(base.join("omni-12-old.zip").exists());
        assert!(base.join("notes.txt").exists());
        assert!(base.join("omni-13-dir").is_dir());
        assert!(!base.join("omni-13-a.zip").exists());

        let state = config.preferences().download_state();
        assert_eq!(state.latest_full_name, None);
        assert_eq!(state.download_size, keys::DOWNLOAD_SIZE_UNKNOWN);
        assert!(!config.preferences().start_hint_shown());

        // Second run finds nothing
        assert_eq!(config.clean_files().unwrap(), 0);
    }

    #[test]
    fn test_clean_files_without_directory() {
        let dir = TempDir::new().unwrap();
        let (config, _) = config_at(&dir.path().join("absent"), props("13", false));
        assert_eq!(config.clean_files().unwrap(), 0);
    }

    #[test]
    fn test_keep_screen_on_from_build() {
        let mut build = BuildConfig::default();
        build.device.keep_screen_on = Some(vec!["guacamole".to_string()]);
        let platform = Platform::new(Arc::new(props("13", false)), Arc::new(StdFilesystem::new()));
        let config = Config::new(build, platform, Arc::new(MemoryStore::new()));
        assert!(config.keep_screen_on());
    }

    proptest! {
        #[test]
        fn prop_resolution_is_deterministic(
            version in "[A-Za-z0-9._{}-]{0,24}",
            device in "[a-z0-9_{}]{0,12}",
            android in "[0-9.]{0,4}",
        ) {
            let source = || {
                StaticSource::new()
                    .with("ro.omni.version", version.clone())
                    .with("ro.omni.device", device.clone())
                    .with("ro.build.version.release", android.clone())
            };
            let build = BuildConfig::default();
            let first = Resolver::new(Arc::new(source()), &build).resolve().clone();
            let second = Resolver::new(Arc::new(source()), &build).resolve().clone();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.locators.filename_base, format!("omni-{version}"));
            prop_assert_eq!(first.locators.filename_base_prefix, format!("omni-{android}"));
        }

        #[test]
        fn prop_secure_mode_is_clamped(
            apply in any::<bool>(),
            inject in any::<bool>(),
            secure in any::<bool>(),
            default in any::<bool>(),
            requests in proptest::collection::vec(any::<bool>(), 0..6),
        ) {
            let capability = SecurityCapability {
                apply_signature: apply,
                inject_signature_enable: inject,
                secure_mode_enable: secure,
                secure_mode_default: default,
                ..SecurityCapability::default()
            };
            let gate = apply && inject && secure;
            prop_assert_eq!(capability.effective_capability(), gate);

            let policy = SecurityPolicy::new(capability, Arc::new(MemoryStore::new()));
            prop_assert_eq!(policy.current_policy(), gate && default);
            for requested in requests {
                let result = policy.set_policy(requested).unwrap();
                prop_assert_eq!(result, gate && requested);
                prop_assert_eq!(policy.current_policy(), result);
            }
            if !gate {
                prop_assert_eq!(policy.effective_inject_signature(), inject);
            }
        }
    }
}
