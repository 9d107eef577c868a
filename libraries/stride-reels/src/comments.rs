//! Comments overlay
//!
//! One level of threaded replies over a flat list: top-level comments are
//! newest-first, replies oldest-first, and each reply group is collapsed
//! until its parent is expanded. Comment likes follow the store's
//! optimistic-then-reconcile pattern.

use crate::error::{FeedError, Result};
use std::collections::HashSet;
use stride_core::{Comment, CommentId, ReelId, StrideError, UserId};
use tracing::{debug, warn};

/// One rendered row of the comments sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommentRow<'a> {
    /// Top-level comment
    Comment(&'a Comment),
    /// Reply under an expanded parent
    Reply(&'a Comment),
    /// "View N replies" affordance under a collapsed parent
    ViewReplies {
        /// Parent comment
        parent_id: &'a CommentId,
        /// Hidden replies
        count: usize,
    },
    /// "Hide replies" affordance under an expanded parent
    HideReplies {
        /// Parent comment
        parent_id: &'a CommentId,
    },
}

/// Comments of one reel
#[derive(Debug, Clone)]
pub struct CommentThread {
    reel_id: ReelId,
    comments: Vec<Comment>,
    expanded: HashSet<CommentId>,
    likes_in_flight: HashSet<CommentId>,
}

impl CommentThread {
    /// Build a thread from the fetched list
    pub fn new(reel_id: ReelId, comments: Vec<Comment>) -> Self {
        let mut thread = Self {
            reel_id,
            comments,
            expanded: HashSet::new(),
            likes_in_flight: HashSet::new(),
        };

        // Fetch order is arbitrary, so resolve roots once everything is in
        let roots: Vec<Option<CommentId>> = thread
            .comments
            .iter()
            .map(|c| c.parent_id.as_ref().map(|parent| thread.root_of(parent)))
            .collect();
        for (comment, root) in thread.comments.iter_mut().zip(roots) {
            comment.parent_id = root;
        }
        thread
    }

    /// Reel the thread belongs to
    pub fn reel_id(&self) -> &ReelId {
        &self.reel_id
    }

    /// Total comments including replies
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Whether the thread is empty
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Look up a comment
    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    fn get_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    fn is_top_level(&self, comment: &Comment) -> bool {
        match &comment.parent_id {
            None => true,
            // Orphaned replies are shown at the top level
            Some(parent) => self.get(parent).is_none(),
        }
    }

    /// Top-level comments, newest first
    pub fn top_level(&self) -> Vec<&Comment> {
        let mut top: Vec<&Comment> = self
            .comments
            .iter()
            .filter(|c| self.is_top_level(c))
            .collect();
        top.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        top
    }

    /// Replies to `parent`, oldest first
    pub fn replies(&self, parent: &CommentId) -> Vec<&Comment> {
        let mut replies: Vec<&Comment> = self
            .comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        replies
    }

    /// Number of replies to `parent`
    pub fn reply_count(&self, parent: &CommentId) -> usize {
        self.comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .count()
    }

    /// Whether `parent`'s replies are shown
    pub fn is_expanded(&self, parent: &CommentId) -> bool {
        self.expanded.contains(parent)
    }

    /// Expand or collapse `parent`'s replies; returns the new expanded state
    pub fn toggle_replies(&mut self, parent: &CommentId) -> bool {
        if self.expanded.remove(parent) {
            false
        } else {
            self.expanded.insert(parent.clone());
            true
        }
    }

    /// Flattened rows for the sheet
    pub fn rows(&self) -> Vec<CommentRow<'_>> {
        let mut rows = Vec::with_capacity(self.comments.len());
        for comment in self.top_level() {
            rows.push(CommentRow::Comment(comment));

            let count = self.reply_count(&comment.id);
            if count == 0 {
                continue;
            }
            if self.is_expanded(&comment.id) {
                rows.extend(self.replies(&comment.id).into_iter().map(CommentRow::Reply));
                rows.push(CommentRow::HideReplies {
                    parent_id: &comment.id,
                });
            } else {
                rows.push(CommentRow::ViewReplies {
                    parent_id: &comment.id,
                    count,
                });
            }
        }
        rows
    }

    /// Add a comment returned by the server
    ///
    /// A new reply expands its parent so the author sees it.
    pub fn insert(&mut self, comment: Comment) {
        if let Some(existing) = self.get_mut(&comment.id) {
            *existing = comment;
            return;
        }
        if let Some(parent) = self.push(comment) {
            self.expanded.insert(parent);
        }
    }

    /// Append, re-pointing replies-to-replies at the top-level ancestor
    fn push(&mut self, mut comment: Comment) -> Option<CommentId> {
        if let Some(parent) = comment.parent_id.take() {
            comment.parent_id = Some(self.root_of(&parent));
        }
        let parent = comment.parent_id.clone();
        self.comments.push(comment);
        parent
    }

    /// Top-level ancestor of `id`
    ///
    /// Stops at a missing parent, and after `len` hops on a cyclic chain.
    fn root_of(&self, id: &CommentId) -> CommentId {
        let mut root = id;
        for _ in 0..self.comments.len() {
            match self.get(root).and_then(|c| c.parent_id.as_ref()) {
                Some(parent) if parent != root => root = parent,
                _ => break,
            }
        }
        root.clone()
    }

    /// Optimistically flip `user`'s like on a comment
    ///
    /// Returns `None` while a like request for the comment is in flight.
    pub fn begin_toggle_like(&mut self, id: &CommentId, user: &UserId) -> Result<Option<bool>> {
        if self.likes_in_flight.contains(id) {
            debug!(comment_id = %id, "Comment like already in flight, coalescing");
            return Ok(None);
        }
        let comment = self
            .get_mut(id)
            .ok_or_else(|| FeedError::CommentNotFound(id.clone()))?;
        let liked = comment.toggle_like(user);
        self.likes_in_flight.insert(id.clone());
        Ok(Some(liked))
    }

    /// Reconcile a comment like; no rollback on failure
    pub fn finish_like(&mut self, id: &CommentId, outcome: std::result::Result<Comment, StrideError>) {
        self.likes_in_flight.remove(id);
        match outcome {
            Ok(server) if &server.id == id => {
                if let Some(existing) = self.get_mut(id) {
                    existing.liked_user_ids = server.liked_user_ids;
                }
            }
            Ok(server) => {
                warn!(comment_id = %id, returned = %server.id, "Like response for a different comment, ignoring");
            }
            Err(e) => {
                warn!(comment_id = %id, error = %e, "Comment like failed, keeping optimistic state");
            }
        }
    }
}
