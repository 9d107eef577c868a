//! The signed-in user as seen by the feed

use super::ids::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current user and the authors they follow
///
/// Session storage is owned elsewhere; the feed only needs identity and the
/// follow graph to decide which reels are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Signed-in user
    pub id: UserId,

    /// Authors the user follows
    #[serde(default)]
    pub following: HashSet<UserId>,
}

impl CurrentUser {
    /// User following nobody
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            following: HashSet::new(),
        }
    }

    /// User following `authors`
    pub fn with_following(id: UserId, authors: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id,
            following: authors.into_iter().collect(),
        }
    }

    /// Whether reels by `author` may appear in the feed
    pub fn can_see_author(&self, author: &UserId) -> bool {
        *author == self.id || self.following.contains(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_and_followed_authors_are_visible() {
        let me = CurrentUser::with_following(UserId::new("me"), [UserId::new("friend")]);
        assert!(me.can_see_author(&UserId::new("me")));
        assert!(me.can_see_author(&UserId::new("friend")));
        assert!(!me.can_see_author(&UserId::new("stranger")));
    }
}
