//! # Error Types
//!
//! Structured error types for firebat_core. Every failure that can reach
//! the user ends up as a line in the log console, so each variant renders a
//! self-contained message.
//!
//! ## Example
//!
//! ```rust
//! use firebat_core::errors::{FirebatError, FirebatResult};
//!
//! fn require_file(opened: bool) -> FirebatResult<()> {
//!     if !opened {
//!         return Err(FirebatError::NoFileOpen);
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(require_file(false).unwrap_err().error_code(), "NO_FILE_OPEN");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for firebat_core operations
pub type FirebatResult<T> = Result<T, FirebatError>;

/// Structured error type for bridge, layout and configuration operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FirebatError {
    /// The engine rejected a command (the `Err(String)` side of an invoke)
    #[error("{command}: {message}")]
    Engine { command: String, message: String },

    /// The engine process could not be reached (spawn, pipe, exit)
    #[error("Engine transport error: {operation} - {reason}")]
    Transport { operation: String, reason: String },

    /// The engine answered with something that is not a valid response
    #[error("Engine protocol error: {reason}")]
    Protocol { reason: String },

    /// A user-supplied address could not be parsed
    #[error("Invalid Address: '{input}'")]
    InvalidAddress { input: String },

    /// A layout violates the one-container-per-panel rule
    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    /// Settings file could not be read or parsed
    #[error("Config error: '{path}' - {reason}")]
    Config { path: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// An analysis command was issued before any binary was opened
    #[error("No file is open")]
    NoFileOpen,
}

impl FirebatError {
    /// Create an Engine error
    pub fn engine(command: impl Into<String>, message: impl Into<String>) -> Self {
        FirebatError::Engine {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a Transport error
    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        FirebatError::Transport {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a Protocol error
    pub fn protocol(reason: impl Into<String>) -> Self {
        FirebatError::Protocol {
            reason: reason.into(),
        }
    }

    /// Create an InvalidAddress error
    pub fn invalid_address(input: impl Into<String>) -> Self {
        FirebatError::InvalidAddress {
            input: input.into(),
        }
    }

    /// Create an InvalidLayout error
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        FirebatError::InvalidLayout {
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FirebatError::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Failures of the connection itself rather than of a request.
    /// They leave the engine pipe unusable but may clear up once the
    /// engine is restarted.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FirebatError::Transport { .. } | FirebatError::Protocol { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FirebatError::Engine { .. } => "ENGINE_ERROR",
            FirebatError::Transport { .. } => "TRANSPORT_ERROR",
            FirebatError::Protocol { .. } => "PROTOCOL_ERROR",
            FirebatError::InvalidAddress { .. } => "INVALID_ADDRESS",
            FirebatError::InvalidLayout { .. } => "INVALID_LAYOUT",
            FirebatError::Config { .. } => "CONFIG_ERROR",
            FirebatError::Serialization { .. } => "SERIALIZATION_ERROR",
            FirebatError::NoFileOpen => "NO_FILE_OPEN",
        }
    }
}

impl From<serde_json::Error> for FirebatError {
    fn from(e: serde_json::Error) -> Self {
        FirebatError::Serialization {
            reason: e.to_string(),
        }
    }
}
