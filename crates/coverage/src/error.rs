//! Error types for the coverage pipeline

use thiserror::Error;

/// Result type alias using the coverage Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed coverage line {line:?}: {source}")]
    Malformed {
        line: String,
        source: std::num::ParseIntError,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
