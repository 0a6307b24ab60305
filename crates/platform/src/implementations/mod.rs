//! Concrete platform implementations

pub mod getprop;
pub mod prop_file;
pub mod static_props;
pub mod std_fs;

pub use getprop::GetpropSource;
pub use prop_file::PropFileSource;
pub use static_props::StaticSource;
pub use std_fs::StdFilesystem;
