//! CLI error handling

use std::fmt;

use opendelta_errors::UserFacingError;
use serde::Serialize;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(opendelta_errors::ConfigError),
    /// Error from the configuration core
    Core(opendelta_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Core(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

/// Error document printed instead of a result in JSON mode
#[derive(Serialize)]
struct ErrorReport {
    message: String,
    code: Option<&'static str>,
    hint: Option<&'static str>,
    retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

impl CliError {
    fn report(&self) -> ErrorReport {
        match self {
            CliError::Config(e) => ErrorReport {
                message: e.user_message().into_owned(),
                code: e.user_code(),
                hint: e.user_hint(),
                retryable: e.is_retryable(),
                detail: serde_json::to_value(e).ok(),
            },
            CliError::Core(e) => ErrorReport {
                message: e.user_message().into_owned(),
                code: e.user_code(),
                hint: e.user_hint(),
                retryable: e.is_retryable(),
                detail: serde_json::to_value(e).ok(),
            },
            CliError::Io(e) => ErrorReport {
                message: e.to_string(),
                code: Some("error.io"),
                hint: None,
                retryable: false,
                detail: None,
            },
        }
    }

    /// Render as a JSON document of the form `{"type": "error", "data": ...}`
    pub fn to_json(&self) -> String {
        let document = serde_json::json!({ "type": "error", "data": self.report() });
        format!("{document:#}")
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Core(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<opendelta_errors::ConfigError> for CliError {
    fn from(e: opendelta_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<opendelta_errors::Error> for CliError {
    fn from(e: opendelta_errors::Error) -> Self {
        CliError::Core(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
