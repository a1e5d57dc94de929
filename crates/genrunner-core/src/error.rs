//! Error types for the generator runner.
//!
//! The taxonomy separates configuration errors (bad capacity bound, malformed
//! project file) from IPC failures so callers can map them to distinct exit
//! statuses.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for genrunner operations.
#[derive(Debug, Error)]
pub enum GenRunnerError {
    // Configuration errors (detected before any shared-memory interaction)
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Project file errors
    #[error("Project file error: {message}")]
    Project { message: String },

    // Shared-segment create/attach failures
    #[error("IPC error: {message}")]
    Ipc {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // Inter-process lock failures
    #[error("Lock error: {message}")]
    Lock {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // Generator resolution errors
    #[error("Generator error: {message}")]
    Plugin { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for genrunner operations.
pub type Result<T> = std::result::Result<T, GenRunnerError>;

impl From<std::io::Error> for GenRunnerError {
    fn from(err: std::io::Error) -> Self {
        GenRunnerError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl GenRunnerError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        GenRunnerError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        GenRunnerError::Config {
            message: message.into(),
        }
    }

    /// Map to a process exit status.
    ///
    /// Configuration errors exit with 2 so scripts can distinguish "you
    /// passed a bad capacity bound" from generation or IPC failures (1).
    pub fn exit_code(&self) -> i32 {
        match self {
            GenRunnerError::Config { .. } | GenRunnerError::Project { .. } => 2,
            _ => 1,
        }
    }

    /// True for configuration errors, which callers must not retry.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            GenRunnerError::Config { .. } | GenRunnerError::Project { .. }
        )
    }
}
