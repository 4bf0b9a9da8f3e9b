//! Error types for modern-rest-common

use thiserror::Error;

/// Result type alias for HTTP conversions
pub type Result<T> = std::result::Result<T, CommonError>;

/// Failures while converting between our HTTP values and `http` crate types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<http::Error> for CommonError {
    fn from(err: http::Error) -> Self {
        CommonError::Http(err.to_string())
    }
}
