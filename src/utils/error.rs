//! Error types for TVPlayer
//!
//! This module defines the error type shared by the engine boundary, the
//! source handlers and the configuration layer. We use thiserror for the
//! library error and anyhow only at the binary edge.

use crate::native::NativeState;
use thiserror::Error;

/// Main error type for TVPlayer
#[derive(Error, Debug)]
pub enum PlayerError {
    /// A native command was issued in a state that does not allow it
    #[error("Invalid state for {operation}: {state:?}")]
    InvalidState {
        operation: &'static str,
        state: NativeState,
    },

    /// The native engine reported a failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// Attaching a media source failed
    #[error("Source error: {0}")]
    Source(String),

    /// No handler is registered for the media source variant
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// No async runtime available to drive background work
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlayerError {
    /// Create an engine error from string
    pub fn engine_error<S: Into<String>>(msg: S) -> Self {
        PlayerError::Engine(msg.into())
    }
}

/// Convenience type alias for Results in TVPlayer
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Extension trait for converting other errors to PlayerError
pub trait IntoPlayerError<T> {
    /// Convert this error into a PlayerError with the given context
    fn engine_err(self, context: &str) -> Result<T>;
    fn source_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn engine_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Engine(format!("{}: {}", context, e)))
    }

    fn source_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Source(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Config(format!("{}: {}", context, e)))
    }
}
