//! Error types for the change-feed layer

use thiserror::Error;

/// Errors that can occur talking to the remote change feed
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// The remote store revoked access to this user's collection
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The live stream ended without an error from the backend
    #[error("Stream closed")]
    Closed,

    /// Backend rejected the operation
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for change-feed operations
pub type FeedResult<T> = Result<T, FeedError>;
