//! Fixed property map for tests and host-side tooling

use std::collections::HashMap;

use crate::identity::IdentitySource;

#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    properties: HashMap<String, String>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticSource {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IdentitySource for StaticSource {
    fn lookup(&self, key: &str) -> String {
        self.properties.get(key).cloned().unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
