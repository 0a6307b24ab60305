//! Property lookups through the `getprop` tool

use std::process::{Command, Stdio};

use crate::identity::IdentitySource;

/// Reads properties by running `getprop <key>` on the device.
///
/// Any failure (binary missing, non-zero exit, non-UTF-8 output) is logged
/// at debug level and reported as an empty value.
#[derive(Debug, Clone)]
pub struct GetpropSource {
    program: String,
}

impl GetpropSource {
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("getprop")
    }

    /// Use a different executable, e.g. an absolute path or a wrapper
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GetpropSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for GetpropSource {
    fn lookup(&self, key: &str) -> String {
        let output = match Command::new(&self.program)
            .arg(key)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(program = %self.program, key, error = %e, "property lookup failed");
                return String::new();
            }
        };

        if !output.status.success() {
            tracing::debug!(program = %self.program, key, status = %output.status, "property lookup exited with failure");
            return String::new();
        }

        match String::from_utf8(output.stdout) {
            Ok(value) => value.trim_end_matches(['\r', '\n']).to_string(),
            Err(_) => {
                tracing::debug!(key, "property value is not valid UTF-8");
                String::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "getprop"
    }
}
