//! Error types for document store operations

use crate::error::AppError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to the document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Document absent on a point read
    #[error("Document {id} not found in {alias}")]
    DocumentNotFound { alias: String, id: String },

    /// Transport-level failure
    #[error("Store request failed: {0}")]
    Request(String),

    /// Call-scoped timeout elapsed
    #[error("Store request timed out: {0}")]
    Timeout(String),

    /// Non-success status from the store
    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be interpreted
    #[error("Store response malformed: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Wrap a reqwest failure, preserving the timeout distinction
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(err.to_string())
        } else {
            StoreError::Request(err.to_string())
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Timeout(msg) => AppError::Timeout(msg),
            _ => AppError::Store(err.to_string()),
        }
    }
}
