//! Error types for audiolayer
//!
//! Defines crate-specific error types using thiserror for clear error
//! propagation.
//!
//! Playback paths never return errors: missing clips, out-of-range channel
//! indices, and redundant transport commands are absorbed and logged so
//! fire-and-forget sound calls cannot crash host code. The variants below
//! cover the surfaces where a caller can actually act on a failure
//! (configuration loading, file I/O).

use thiserror::Error;

/// Main error type for audiolayer
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using audiolayer Error
pub type Result<T> = std::result::Result<T, Error>;
