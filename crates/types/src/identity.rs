//! Device identity as reported by the property source

use serde::{Deserialize, Serialize};

/// Identity of the running device and installed build.
///
/// Every field is a plain string copied out of the property source at
/// startup. A property that could not be read is an empty string, never an
/// error, so templates built from an identity always render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Full build version, e.g. `omni-13-20240101-oneplus7pro-WEEKLY`
    pub property_version: String,
    /// Device codename, e.g. `oneplus7pro`
    pub property_device: String,
    /// Android release family, e.g. `13`
    pub android_version: String,
    /// Whether the device uses seamless A/B updates
    pub ab_update: bool,
}

impl DeviceIdentity {
    /// Interpret a raw property value as a boolean the way the property
    /// service does: `1`, `y`, `yes`, `on` and `true` are true.
    #[must_use]
    pub fn parse_bool_property(raw: &str) -> bool {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "y" | "yes" | "on" | "true"
        )
    }

    /// True when the build version carries any of the given release tags.
    ///
    /// Empty tags never match, otherwise an unset tag would classify every
    /// build as official.
    #[must_use]
    pub fn has_any_tag<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> bool {
        tags.into_iter()
            .filter(|tag| !tag.is_empty())
            .any(|tag| self.property_version.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_property_parsing() {
        assert!(DeviceIdentity::parse_bool_property("true"));
        assert!(DeviceIdentity::parse_bool_property(" 1\n"));
        assert!(!DeviceIdentity::parse_bool_property(""));
        assert!(!DeviceIdentity::parse_bool_property("false"));
    }

    #[test]
    fn empty_tags_never_match() {
        let identity = DeviceIdentity {
            property_version: "omni-13-20240101-guacamole-HOMEMADE".into(),
            ..DeviceIdentity::default()
        };
        assert!(!identity.has_any_tag(["", "WEEKLY"]));
        assert!(identity.has_any_tag(["", "HOMEMADE"]));
    }
}
