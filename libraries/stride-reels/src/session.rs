//! Feed session
//!
//! Pairs a `ReelFeed` with the backend. Local state is always applied before
//! the request goes out; what happens on failure depends on the action:
//! - `load` surfaces the error and leaves the store untouched
//! - likes, bookmarks, hide and mute are swallowed (logged) and keep the
//!   local change
//! - `report` keeps the local exclusion but returns `ModerationAction`
//! - `delete_reel` is not optimistic and surfaces the error

use crate::comments::CommentThread;
use crate::error::{FeedError, Result};
use crate::feed::ReelFeed;
use std::sync::Arc;
use stride_core::{
    Comment, CommentId, CreateComment, ReelId, ReelsApi, ReportRequest, ReportResponse, UserId,
};
use tracing::{debug, info, warn};

/// A feed bound to a backend
pub struct FeedSession<A: ReelsApi> {
    feed: ReelFeed,
    api: Arc<A>,
    comments: Option<CommentThread>,
}

impl<A: ReelsApi> FeedSession<A> {
    /// Bind `feed` to `api`
    pub fn new(feed: ReelFeed, api: Arc<A>) -> Self {
        Self {
            feed,
            api,
            comments: None,
        }
    }

    /// The feed
    pub fn feed(&self) -> &ReelFeed {
        &self.feed
    }

    /// The feed, for scroll/focus/resource inputs
    pub fn feed_mut(&mut self) -> &mut ReelFeed {
        &mut self.feed
    }

    /// Fetch the full collection and replace the store
    ///
    /// Not retried automatically; on failure the store keeps its contents.
    pub async fn load(&mut self) -> Result<usize> {
        let reels = self.api.fetch_reels().await.map_err(|e| {
            warn!(error = %e, "Failed to load reels");
            FeedError::from(e)
        })?;
        let count = reels.len();
        self.feed.replace_reels(reels);
        Ok(count)
    }

    /// Toggle the current user's like on `id`
    ///
    /// Returns the optimistic liked state, or `None` if a request was
    /// already in flight. Network failures are logged, not returned.
    pub async fn toggle_like(&mut self, id: &ReelId) -> Result<Option<bool>> {
        let Some(liked) = self.feed.begin_toggle_like(id)? else {
            return Ok(None);
        };
        debug!(reel_id = %id, liked, "Sending like");
        let outcome = self.api.like_reel(id).await;
        self.feed.finish_like(id, outcome);
        Ok(Some(liked))
    }

    /// Toggle the bookmark on `id`
    pub async fn toggle_bookmark(&mut self, id: &ReelId) -> Result<Option<bool>> {
        let Some(saved) = self.feed.begin_toggle_bookmark(id)? else {
            return Ok(None);
        };
        let outcome = self
            .api
            .set_bookmark(id, saved)
            .await
            .map(|response| response.saved_reels);
        self.feed.finish_bookmark(id, outcome);
        Ok(Some(saved))
    }

    /// Mute `author` locally and record it server-side
    pub async fn mute_author(&mut self, author: &UserId) -> bool {
        let changed = self.feed.mute_author(author);
        if let Err(e) = self.api.mute_author(author).await {
            warn!(author_id = %author, error = %e, "Mute request failed, keeping local mute");
        }
        changed
    }

    /// Hide `id` locally and record it server-side
    pub async fn hide_reel(&mut self, id: &ReelId) -> bool {
        let changed = self.feed.hide_reel(id);
        if let Err(e) = self.api.hide_reel(id).await {
            warn!(reel_id = %id, error = %e, "Hide request failed, keeping local hide");
        }
        changed
    }

    /// Report `id`
    ///
    /// The reel leaves the visible list immediately and stays out even if
    /// the report request fails.
    pub async fn report(&mut self, id: &ReelId, request: &ReportRequest) -> Result<ReportResponse> {
        self.feed.report_reel(id);

        match self.api.report_reel(id, request).await {
            Ok(response) if response.ok => {
                info!(reel_id = %id, reason = ?request.reason, "Reel reported");
                Ok(response)
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "report rejected".to_string());
                warn!(reel_id = %id, message = %message, "Report rejected, keeping local exclusion");
                Err(FeedError::ModerationAction(message))
            }
            Err(e) => {
                warn!(reel_id = %id, error = %e, "Report failed, keeping local exclusion");
                Err(FeedError::ModerationAction(e.to_string()))
            }
        }
    }

    /// Delete one of the current user's reels
    ///
    /// Removed locally only after the backend confirms.
    pub async fn delete_reel(&mut self, id: &ReelId) -> Result<()> {
        let response = self.api.delete_reel(id).await?;
        if !response.ok {
            return Err(FeedError::InvalidOperation(format!(
                "backend refused to delete reel {id}"
            )));
        }
        self.feed.remove_reel(id);
        info!(reel_id = %id, "Reel deleted");
        Ok(())
    }

    // ===== Comments =====

    /// Fetch and open the comment thread for `id`
    pub async fn open_comments(&mut self, id: &ReelId) -> Result<&CommentThread> {
        let comments = self.api.fetch_comments(id).await?;
        let thread = CommentThread::new(id.clone(), comments);
        self.feed.sync_comment_count(&thread);
        Ok(self.comments.insert(thread))
    }

    /// Close the comments sheet
    pub fn close_comments(&mut self) {
        self.comments = None;
    }

    /// Open thread, if any
    pub fn comments(&self) -> Option<&CommentThread> {
        self.comments.as_ref()
    }

    /// Open thread, for expand/collapse
    pub fn comments_mut(&mut self) -> Option<&mut CommentThread> {
        self.comments.as_mut()
    }

    /// Post to the open thread
    ///
    /// Not optimistic: the comment needs its server id before it is shown.
    pub async fn post_comment(&mut self, request: &CreateComment) -> Result<Comment> {
        let thread = self
            .comments
            .as_mut()
            .ok_or_else(|| FeedError::InvalidOperation("no comment thread open".to_string()))?;
        let reel_id = thread.reel_id().clone();

        let comment = self.api.post_comment(&reel_id, request).await?;
        thread.insert(comment.clone());
        self.feed.record_comment_added(&reel_id);
        Ok(comment)
    }

    /// Toggle the current user's like on a comment in the open thread
    pub async fn toggle_comment_like(&mut self, id: &CommentId) -> Result<Option<bool>> {
        let viewer = self.feed.viewer().id.clone();
        let thread = self
            .comments
            .as_mut()
            .ok_or_else(|| FeedError::InvalidOperation("no comment thread open".to_string()))?;

        let Some(liked) = thread.begin_toggle_like(id, &viewer)? else {
            return Ok(None);
        };
        let reel_id = thread.reel_id().clone();
        let outcome = self.api.like_comment(&reel_id, id).await;
        thread.finish_like(id, outcome);
        Ok(Some(liked))
    }
}
