//! Device property lookups

/// Read-only access to device properties.
///
/// Lookups are total: a property that is missing, or a source that cannot
/// be queried at all, yields an empty string. Implementations must not have
/// side effects visible to callers.
pub trait IdentitySource: Send + Sync {
    /// Return the value of `key`, or an empty string when unavailable
    fn lookup(&self, key: &str) -> String;

    /// Short name used in diagnostics
    fn name(&self) -> &'static str;
}

impl<T: IdentitySource + ?Sized> IdentitySource for Box<T> {
    fn lookup(&self, key: &str) -> String {
        (**self).lookup(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: IdentitySource + ?Sized> IdentitySource for std::sync::Arc<T> {
    fn lookup(&self, key: &str) -> String {
        (**self).lookup(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
