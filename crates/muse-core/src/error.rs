//! Error types for muse-core

use thiserror::Error;

/// Result type alias using muse-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in note store and backend operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote table rejected the request
    #[error("{0}")]
    Api(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation needs a signed-in user
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
