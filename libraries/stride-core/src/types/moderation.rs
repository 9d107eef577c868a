//! Moderation and bookmark request/response types

use super::ids::ReelId;
use serde::{Deserialize, Serialize};

/// Why a reel is being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    /// Unsolicited promotion
    Spam,
    /// Nudity, violence, or otherwise unsuitable
    Inappropriate,
    /// Targeted abuse
    Harassment,
    /// Dangerous or false claims
    Misinformation,
    /// Free-form reason in the comment
    Other,
}

/// Request body for `POST /reels/:id/report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Report category
    pub reason: ReportReason,

    /// Optional free-text detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ReportRequest {
    /// Report without a comment
    pub fn new(reason: ReportReason) -> Self {
        Self {
            reason,
            comment: None,
        }
    }

    /// Attach a free-text comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Response from `POST /reels/:id/report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Whether the server recorded the report
    pub ok: bool,

    /// Optional message for the report flow to display
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from the bookmark endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    /// The user's full saved-reel list after the change
    #[serde(default)]
    pub saved_reels: Vec<ReelId>,
}

/// Bare `{ok}` acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    /// Whether the server applied the change
    pub ok: bool,
}
