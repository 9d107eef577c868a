//! Reel store
//!
//! Exclusively owns the fetched reel collection. Local edits are applied
//! optimistically and reconciled with the server response; failures are
//! logged and left for the next successful load to correct.

use crate::error::{FeedError, Result};
use std::collections::HashSet;
use stride_core::{Reel, ReelId, StrideError, UserId};
use tracing::{debug, warn};

/// Full reel collection in fetch order
#[derive(Debug, Clone, Default)]
pub struct ReelStore {
    /// Reels in the order the backend returned them
    reels: Vec<Reel>,

    /// Reels the current user has bookmarked
    saved: HashSet<ReelId>,

    /// Reels with a like request on the wire
    likes_in_flight: HashSet<ReelId>,

    /// Reels with a bookmark request on the wire
    bookmarks_in_flight: HashSet<ReelId>,
}

impl ReelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection (successful `load()`)
    pub fn replace_all(&mut self, reels: Vec<Reel>) {
        debug!(count = reels.len(), "Replacing reel collection");
        self.reels = reels;
    }

    /// All reels in fetch order
    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    /// Look up a reel
    pub fn get(&self, id: &ReelId) -> Option<&Reel> {
        self.reels.iter().find(|r| &r.id == id)
    }

    fn get_mut(&mut self, id: &ReelId) -> Option<&mut Reel> {
        self.reels.iter_mut().find(|r| &r.id == id)
    }

    /// Whether the store holds `id`
    pub fn contains(&self, id: &ReelId) -> bool {
        self.get(id).is_some()
    }

    /// Number of reels
    pub fn len(&self) -> usize {
        self.reels.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.reels.is_empty()
    }

    /// Insert a reel, or replace the existing one in place
    pub fn upsert(&mut self, reel: Reel) {
        match self.get_mut(&reel.id) {
            Some(existing) => *existing = reel,
            None => self.reels.push(reel),
        }
    }

    /// Remove a reel (after a confirmed delete)
    pub fn remove(&mut self, id: &ReelId) -> Option<Reel> {
        let pos = self.reels.iter().position(|r| &r.id == id)?;
        self.saved.remove(id);
        Some(self.reels.remove(pos))
    }

    // ===== Likes =====

    /// Optimistically flip `user`'s like on `id`
    ///
    /// Returns the new liked state, or `None` when a like request for this
    /// reel is already in flight. Coalescing keeps a double-tap from turning
    /// into two toggles racing two responses.
    pub fn begin_toggle_like(&mut self, id: &ReelId, user: &UserId) -> Result<Option<bool>> {
        if self.likes_in_flight.contains(id) {
            debug!(reel_id = %id, "Like already in flight, coalescing");
            return Ok(None);
        }

        let reel = self
            .get_mut(id)
            .ok_or_else(|| FeedError::ReelNotFound(id.clone()))?;
        let liked = reel.toggle_like(user);
        self.likes_in_flight.insert(id.clone());

        Ok(Some(liked))
    }

    /// Whether a like request for `id` is on the wire
    pub fn is_like_in_flight(&self, id: &ReelId) -> bool {
        self.likes_in_flight.contains(id)
    }

    /// Reconcile a like request
    ///
    /// The server's reel replaces local state. On failure nothing is rolled
    /// back; the next load corrects it.
    pub fn finish_like(&mut self, id: &ReelId, outcome: std::result::Result<Reel, StrideError>) {
        self.likes_in_flight.remove(id);

        match outcome {
            Ok(reel) if &reel.id == id => {
                if let Some(existing) = self.get_mut(id) {
                    *existing = reel;
                }
            }
            Ok(reel) => {
                warn!(reel_id = %id, returned = %reel.id, "Like response for a different reel, ignoring");
            }
            Err(e) => {
                warn!(reel_id = %id, error = %e, "Like request failed, keeping optimistic state");
            }
        }
    }

    // ===== Bookmarks =====

    /// Whether the current user saved `id`
    pub fn is_saved(&self, id: &ReelId) -> bool {
        self.saved.contains(id)
    }

    /// Replace the saved-reel set
    pub fn set_saved(&mut self, ids: impl IntoIterator<Item = ReelId>) {
        self.saved = ids.into_iter().collect();
    }

    /// Optimistically flip the bookmark on `id`
    ///
    /// Returns the new saved state, or `None` while a bookmark request for
    /// this reel is in flight.
    pub fn begin_toggle_bookmark(&mut self, id: &ReelId) -> Result<Option<bool>> {
        if !self.contains(id) {
            return Err(FeedError::ReelNotFound(id.clone()));
        }
        if self.bookmarks_in_flight.contains(id) {
            return Ok(None);
        }

        let saved = if self.saved.remove(id) {
            false
        } else {
            self.saved.insert(id.clone());
            true
        };
        self.bookmarks_in_flight.insert(id.clone());

        Ok(Some(saved))
    }

    /// Reconcile a bookmark request with the server's saved list
    pub fn finish_bookmark(
        &mut self,
        id: &ReelId,
        outcome: std::result::Result<Vec<ReelId>, StrideError>,
    ) {
        self.bookmarks_in_flight.remove(id);

        match outcome {
            Ok(saved) => self.set_saved(saved),
            Err(e) => {
                warn!(reel_id = %id, error = %e, "Bookmark request failed, keeping optimistic state");
            }
        }
    }

    // ===== Comments =====

    /// Bump the comment counter after a comment was posted
    pub fn record_comment_added(&mut self, id: &ReelId) {
        if let Some(reel) = self.get_mut(id) {
            reel.increment_comments();
        }
    }

    /// Set the comment counter from a fetched thread
    pub fn sync_comment_count(&mut self, id: &ReelId, count: usize) {
        if let Some(reel) = self.get_mut(id) {
            reel.comment_count = u32::try_from(count).unwrap_or(u32::MAX);
        }
    }
}
