//! Signature verification ("secure mode") policy
//!
//! Three build flags gate whether secure mode can be offered at all. Only
//! when all three are set is the user's stored choice consulted, and only
//! then can it be stored as `true`.

use opendelta_errors::Error;
use opendelta_store::PreferenceStore;
use opendelta_types::PrefValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::keys;

/// Signature-related build flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCapability {
    #[serde(default = "default_true")]
    pub apply_signature: bool,
    #[serde(default = "default_true")]
    pub inject_signature_enable: bool,
    #[serde(default)]
    pub inject_signature_keys: String,
    #[serde(default = "default_true")]
    pub secure_mode_enable: bool,
    #[serde(default)]
    pub secure_mode_default: bool,
}

impl Default for SecurityCapability {
    fn default() -> Self {
        Self {
            apply_signature: true,
            inject_signature_enable: true,
            inject_signature_keys: String::new(),
            secure_mode_enable: true,
            secure_mode_default: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl SecurityCapability {
    /// Whether secure mode is a real option on this build
    #[must_use]
    pub fn effective_capability(&self) -> bool {
        self.apply_signature && self.inject_signature_enable && self.secure_mode_enable
    }

    /// Secure mode state before the user has chosen anything
    #[must_use]
    pub fn default_policy(&self) -> bool {
        self.secure_mode_default && self.effective_capability()
    }
}

/// Effective secure-mode policy backed by the preference store
#[derive(Clone)]
pub struct SecurityPolicy {
    capability: SecurityCapability,
    store: Arc<dyn PreferenceStore>,
}

impl SecurityPolicy {
    #[must_use]
    pub fn new(capability: SecurityCapability, store: Arc<dyn PreferenceStore>) -> Self {
        Self { capability, store }
    }

    #[must_use]
    pub fn capability(&self) -> &SecurityCapability {
        &self.capability
    }

    #[must_use]
    pub fn effective_capability(&self) -> bool {
        self.capability.effective_capability()
    }

    #[must_use]
    pub fn default_policy(&self) -> bool {
        self.capability.default_policy()
    }

    /// Whether signatures must be verified right now
    #[must_use]
    pub fn current_policy(&self) -> bool {
        if !self.effective_capability() {
            return false;
        }
        match self.store.get(keys::SECURE_MODE) {
            None => self.default_policy(),
            Some(PrefValue::Bool(value)) => value,
            Some(other) => {
                tracing::warn!(
                    key = keys::SECURE_MODE,
                    kind = other.kind(),
                    "stored secure mode is not a boolean, using default"
                );
                self.default_policy()
            }
        }
    }

    /// Store the user's choice, clamped by the capability, and return the
    /// resulting policy. Disabling always succeeds; enabling only sticks
    /// when the build allows secure mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference store rejects the write.
    pub fn set_policy(&self, requested: bool) -> Result<bool, Error> {
        let stored = self.effective_capability() && requested;
        if requested && !stored {
            tracing::info!("secure mode requested but not available on this build");
        }
        self.store.put(keys::SECURE_MODE, PrefValue::Bool(stored))?;
        Ok(self.current_policy())
    }

    /// Whether the verification key is injected into update packages.
    ///
    /// Follows the user's secure-mode choice when secure mode is available,
    /// otherwise the fixed build flag.
    #[must_use]
    pub fn effective_inject_signature(&self) -> bool {
        if self.effective_capability() {
            self.current_policy()
        } else {
            self.capability.inject_signature_enable
        }
    }

    /// Keys injected when signature injection is active
    #[must_use]
    pub fn inject_signature_keys(&self) -> &str {
        &self.capability.inject_signature_keys
    }

    #[must_use]
    pub fn apply_signature(&self) -> bool {
        self.capability.apply_signature
    }
}

impl std::fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityPolicy")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

/// Serializable view of the resolved policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecuritySummary {
    pub apply_signature: bool,
    pub secure_mode_available: bool,
    pub secure_mode_default: bool,
    pub secure_mode_current: bool,
    pub inject_signature: bool,
    pub inject_signature_keys: String,
}

impl From<&SecurityPolicy> for SecuritySummary {
    fn from(policy: &SecurityPolicy) -> Self {
        Self {
            apply_signature: policy.apply_signature(),
            secure_mode_available: policy.effective_capability(),
            secure_mode_default: policy.default_policy(),
            secure_mode_current: policy.current_policy(),
            inject_signature: policy.effective_inject_signature(),
            inject_signature_keys: policy.inject_signature_keys().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendelta_store::MemoryStore;

    fn capability(apply: bool, inject: bool, secure: bool, default: bool) -> SecurityCapability {
        SecurityCapability {
            apply_signature: apply,
            inject_signature_enable: inject,
            inject_signature_keys: String::new(),
            secure_mode_enable: secure,
            secure_mode_default: default,
        }
    }

    #[test]
    fn capability_is_a_conjunction() {
        for bits in 0u8..8 {
            let (apply, inject, secure) = (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
            let cap = capability(apply, inject, secure, true);
            assert_eq!(cap.effective_capability(), apply && inject && secure);
            assert_eq!(cap.default_policy(), apply && inject && secure);
        }
    }

    #[test]
    fn stored_choice_ignored_when_gate_closed() {
        let store = Arc::new(MemoryStore::new());
        store.put(keys::SECURE_MODE, PrefValue::Bool(true)).unwrap();
        let policy = SecurityPolicy::new(capability(true, false, true, true), store);
        assert!(!policy.current_policy());
    }

    #[test]
    fn default_applies_until_chosen() {
        let store = Arc::new(MemoryStore::new());
        let policy = SecurityPolicy::new(capability(true, true, true, true), store.clone());
        assert!(policy.current_policy());
        assert!(store.get(keys::SECURE_MODE).is_none());

        assert!(!policy.set_policy(false).unwrap());
        assert_eq!(store.get(keys::SECURE_MODE), Some(PrefValue::Bool(false)));
        assert!(policy.set_policy(true).unwrap());
    }

    #[test]
    fn enable_is_clamped_when_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let policy = SecurityPolicy::new(capability(false, true, true, false), store.clone());
        assert!(!policy.set_policy(true).unwrap());
        assert_eq!(store.get(keys::SECURE_MODE), Some(PrefValue::Bool(false)));
    }

    #[test]
    fn inject_signature_follows_policy_only_when_available() {
        let store = Arc::new(MemoryStore::new());
        let available = SecurityPolicy::new(capability(true, true, true, false), store.clone());
        assert!(!available.effective_inject_signature());
        available.set_policy(true).unwrap();
        assert!(available.effective_inject_signature());

        let fixed = SecurityPolicy::new(capability(true, true, false, false), store);
        assert!(fixed.effective_inject_signature());
        let fixed_off = SecurityPolicy::new(
            capability(true, false, true, false),
            Arc::new(MemoryStore::new()),
        );
        assert!(!fixed_off.effective_inject_signature());
    }

    #[test]
    fn non_boolean_value_falls_back_to_default() {
        let store = Arc::new(MemoryStore::new());
        store.put(keys::SECURE_MODE, PrefValue::from("yes")).unwrap();
        let policy = SecurityPolicy::new(capability(true, true, true, true), store);
        assert!(policy.current_policy());
    }
}
