//! CLI error type.

use std::fmt;
use std::io;

use isodeck::config::ConfigError;
use isodeck::library::LibraryError;

/// Errors surfaced to the operator by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or saved.
    Config(ConfigError),

    /// Image-library operation failed.
    Library(LibraryError),

    /// Terminal prompt failed (non-interactive stdin, closed terminal).
    Prompt(io::Error),

    /// Unmount bookkeeping failed.
    Unmount(String),

    /// Logging could not be initialized.
    Logging(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "configuration error: {}", e),
            CliError::Library(e) => write!(f, "library error: {}", e),
            CliError::Prompt(e) => write!(f, "prompt failed: {}", e),
            CliError::Unmount(msg) => write!(f, "unmount failed: {}", msg),
            CliError::Logging(e) => write!(f, "failed to initialize logging: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Library(e) => Some(e),
            CliError::Prompt(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Unmount(_) => None,
        }
    }
}

impl From<LibraryError> for CliError {
    fn from(e: LibraryError) -> Self {
        CliError::Library(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = CliError::Unmount("target busy".to_string());
        assert!(err.to_string().contains("unmount failed"));
        assert!(err.to_string().contains("target busy"));
    }
}
