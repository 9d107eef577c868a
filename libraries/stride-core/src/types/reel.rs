//! Reel entity

use super::ids::{ReelId, UserId};
use crate::error::StrideError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Outdoor activity shown in a reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Running
    Run,
    /// Hiking
    Hike,
    /// Cycling
    Cycle,
    /// Walking
    Walk,
    /// Anything else
    Other,
}

impl ActivityType {
    /// Wire/display name
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Hike => "hike",
            ActivityType::Cycle => "cycle",
            ActivityType::Walk => "walk",
            ActivityType::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = StrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "run" => Ok(ActivityType::Run),
            "hike" => Ok(ActivityType::Hike),
            "cycle" => Ok(ActivityType::Cycle),
            "walk" => Ok(ActivityType::Walk),
            "other" => Ok(ActivityType::Other),
            other => Err(StrideError::invalid_input(format!(
                "unknown activity type: {other}"
            ))),
        }
    }
}

/// A short-form video post
///
/// `id` is the immutable identity. Everything else can be replaced by a
/// server response or mutated by an optimistic local edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reel {
    /// Unique reel identifier
    pub id: ReelId,

    /// Author of the reel
    pub author_id: UserId,

    /// Opaque media URI resolved by the platform media layer
    pub media_uri: String,

    /// Caption text
    #[serde(default)]
    pub caption: String,

    /// Activity shown in the reel
    pub activity_type: ActivityType,

    /// Users who liked the reel (a user appears at most once)
    #[serde(default)]
    pub liked_user_ids: BTreeSet<UserId>,

    /// Number of comments (never negative)
    #[serde(default)]
    pub comment_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Reel {
    /// Create a reel with no likes, comments, or caption
    pub fn new(
        id: ReelId,
        author_id: UserId,
        media_uri: impl Into<String>,
        activity_type: ActivityType,
    ) -> Self {
        Self {
            id,
            author_id,
            media_uri: media_uri.into(),
            caption: String::new(),
            activity_type,
            liked_user_ids: BTreeSet::new(),
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Builder-style caption setter
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Whether `user` has liked this reel
    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_user_ids.contains(user)
    }

    /// Number of likes
    pub fn like_count(&self) -> usize {
        self.liked_user_ids.len()
    }

    /// Flip `user`'s like membership
    ///
    /// Returns the new liked state.
    pub fn toggle_like(&mut self, user: &UserId) -> bool {
        if self.liked_user_ids.remove(user) {
            false
        } else {
            self.liked_user_ids.insert(user.clone());
            true
        }
    }

    /// Increment the comment counter
    pub fn increment_comments(&mut self) {
        self.comment_count = self.comment_count.saturating_add(1);
    }

    /// Decrement the comment counter, saturating at zero
    pub fn decrement_comments(&mut self) {
        self.comment_count = self.comment_count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reel() -> Reel {
        Reel::new(
            ReelId::new("r1"),
            UserId::new("author"),
            "https://cdn/r1.mp4",
            ActivityType::Hike,
        )
    }

    #[test]
    fn toggle_like_is_set_membership() {
        let me = UserId::new("me");
        let mut reel = reel();

        assert!(reel.toggle_like(&me));
        assert_eq!(reel.like_count(), 1);
        assert!(!reel.toggle_like(&me));
        assert_eq!(reel.like_count(), 0);
    }

    #[test]
    fn comment_count_never_negative() {
        let mut reel = reel();
        reel.decrement_comments();
        assert_eq!(reel.comment_count, 0);

        reel.increment_comments();
        reel.increment_comments();
        reel.decrement_comments();
        assert_eq!(reel.comment_count, 1);
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let json = r#"{
            "id": "r9",
            "authorId": "u2",
            "mediaUri": "https://cdn/r9.mp4",
            "caption": "Ridge line at dawn",
            "activityType": "hike",
            "likedUserIds": ["u1", "u3"],
            "commentCount": 4,
            "createdAt": "2024-05-01T06:30:00Z"
        }"#;

        let reel: Reel = serde_json::from_str(json).unwrap();
        assert_eq!(reel.id, ReelId::new("r9"));
        assert_eq!(reel.activity_type, ActivityType::Hike);
        assert!(reel.is_liked_by(&UserId::new("u3")));
        assert_eq!(reel.comment_count, 4);
    }

    #[test]
    fn activity_type_parsing() {
        assert_eq!("Cycle".parse::<ActivityType>().unwrap(), ActivityType::Cycle);
        assert!("swim".parse::<ActivityType>().is_err());
        assert_eq!(ActivityType::Walk.to_string(), "walk");
    }
}
