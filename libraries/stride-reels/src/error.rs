//! Error types for the reels feed

use stride_core::{CommentId, ReelId, StrideError};
use thiserror::Error;

/// Feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Collection fetch or mutation failed
    #[error("Network error: {0}")]
    Network(#[from] StrideError),

    /// A reel's media failed to decode (isolated to that slot)
    #[error("Decode error for reel {reel_id}: {message}")]
    Decode {
        /// Reel whose media failed
        reel_id: ReelId,
        /// Decoder message
        message: String,
    },

    /// Report/hide/mute request failed; the local exclusion is kept
    #[error("Moderation action failed: {0}")]
    ModerationAction(String),

    /// Reel is not in the store (or not in the visible list)
    #[error("Reel not found: {0}")]
    ReelNotFound(ReelId),

    /// Comment is not in the open thread
    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl FeedError {
    /// Create a decode error
    pub fn decode(reel_id: &ReelId, message: impl Into<String>) -> Self {
        Self::Decode {
            reel_id: reel_id.clone(),
            message: message.into(),
        }
    }
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
