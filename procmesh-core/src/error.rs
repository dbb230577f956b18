//! Error types for procmesh

use thiserror::Error;

/// Main error type for procmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type alias for procmesh operations
pub type Result<T> = std::result::Result<T, Error>;
