//! Bundled platform services

use std::sync::Arc;

use crate::filesystem::FilesystemOperations;
use crate::identity::IdentitySource;
use crate::implementations::{GetpropSource, StdFilesystem};

/// Main platform abstraction providing access to all platform operations
#[derive(Clone)]
pub struct Platform {
    identity: Arc<dyn IdentitySource>,
    filesystem: Arc<dyn FilesystemOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementations
    pub fn new(
        identity: Arc<dyn IdentitySource>,
        filesystem: Arc<dyn FilesystemOperations>,
    ) -> Self {
        Self {
            identity,
            filesystem,
        }
    }

    /// The platform of a running device: `getprop` and the local filesystem
    pub fn current() -> Self {
        Self::new(Arc::new(GetpropSource::new()), Arc::new(StdFilesystem::new()))
    }

    /// Replace the property source, keeping the filesystem
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentitySource>) -> Self {
        self.identity = identity;
        self
    }

    /// Access property lookups
    pub fn identity(&self) -> &dyn IdentitySource {
        &*self.identity
    }

    /// Shared handle to the property source
    pub fn shared_identity(&self) -> Arc<dyn IdentitySource> {
        Arc::clone(&self.identity)
    }

    /// Access filesystem operations
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("identity", &self.identity.name())
            .finish_non_exhaustive()
    }
}
