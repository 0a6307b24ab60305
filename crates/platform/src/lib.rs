//! Platform abstraction layer for the OpenDelta configuration core.
//!
//! This crate provides narrow interfaces to the two platform services the
//! configuration layer reads from:
//! - Device property lookups (`IdentitySource`)
//! - Directory listing and file deletion (`FilesystemOperations`)
//!
//! Production implementations talk to the property service and the local
//! filesystem; `StaticSource` backs tests and host-side tooling.

pub mod core;
pub mod filesystem;
pub mod identity;
pub mod implementations;

pub use core::Platform;
pub use filesystem::{DirEntryInfo, FilesystemOperations};
pub use identity::IdentitySource;
pub use implementations::{GetpropSource, PropFileSource, StaticSource, StdFilesystem};
