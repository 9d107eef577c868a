//! Reel comments (one level of threaded replies)

use super::ids::{CommentId, ReelId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A comment on a reel
///
/// Top-level comments have no `parent_id`; replies point at a top-level
/// comment. Deeper nesting is flattened onto the top-level parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,

    /// Reel the comment belongs to
    pub reel_id: ReelId,

    /// Comment author
    pub author_id: UserId,

    /// Comment body
    pub text: String,

    /// Parent comment for replies
    #[serde(default)]
    pub parent_id: Option<CommentId>,

    /// Users who liked the comment
    #[serde(default)]
    pub liked_user_ids: BTreeSet<UserId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this is a reply
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Whether `user` has liked this comment
    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_user_ids.contains(user)
    }

    /// Flip `user`'s like membership, returning the new liked state
    pub fn toggle_like(&mut self, user: &UserId) -> bool {
        if self.liked_user_ids.remove(user) {
            false
        } else {
            self.liked_user_ids.insert(user.clone());
            true
        }
    }
}

/// Request body for `POST /reels/:id/comments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    /// Comment body
    pub text: String,

    /// Parent comment when replying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl CreateComment {
    /// Top-level comment
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent_id: None,
        }
    }

    /// Reply to `parent`
    pub fn reply(text: impl Into<String>, parent: CommentId) -> Self {
        Self {
            text: text.into(),
            parent_id: Some(parent),
        }
    }
}
