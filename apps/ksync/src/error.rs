//! CLI error handling

use std::fmt;

use ksync_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(ksync_errors::Error),
    /// Manager operation error
    Ops(ksync_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// A worker thread died
    Worker(String),
    /// Report could not be rendered
    Render(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Ops(e) => {
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
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Worker(msg) => write!(f, "Worker failed: {msg}"),
            CliError::Render(e) => write!(f, "Failed to render report: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::InvalidArguments(_) | CliError::Worker(_) => None,
        }
    }
}

impl From<ksync_errors::Error> for CliError {
    fn from(e: ksync_errors::Error) -> Self {
        match e {
            ksync_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Render(e)
    }
}
