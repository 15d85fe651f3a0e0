//! Common error types for the essay grader

use thiserror::Error;

/// Common result type for essay grader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the grader crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token could not be encoded
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
