//! Error types for linkhealth operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for linkhealth operations.
pub type Result<T> = std::result::Result<T, HealthError>;

/// Errors that can occur during health-check operations.
#[derive(Debug, Error)]
pub enum HealthError {
    /// Failed to spawn the device CLI process.
    #[error("Failed to execute command '{command}': {source}")]
    CommandSpawn {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Device command returned a non-zero exit code.
    #[error("Command failed: '{command}' (exit code {exit_code}): {output}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Durable run-counter store operation failed.
    #[error("Run counter store error: {message}")]
    CounterStore {
        /// Error message.
        message: String,
    },

    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HealthError {
    /// Creates a counter store error.
    pub fn counter_store(message: impl Into<String>) -> Self {
        Self::CounterStore {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if this error came from the device command channel.
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            HealthError::CommandSpawn { .. } | HealthError::CommandFailed { .. }
        )
    }
}
