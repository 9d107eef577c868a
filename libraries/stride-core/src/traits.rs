//! Core traits for Stride
use crate::error::Result;
use crate::types::{
    BookmarkResponse, Comment, CommentId, CreateComment, OkResponse, Reel, ReelId, ReportRequest,
    ReportResponse, UserId,
};
use async_trait::async_trait;

/// Backend collaborator for the reels feed
///
/// Implementers speak to the document-store backend. Every call is a single
/// request/response; the caller applies optimistic local state before the
/// call and reconciles with the result.
///
/// Timeouts belong to the implementation (a bounded request timeout); the
/// feed adds none of its own.
#[async_trait]
pub trait ReelsApi: Send + Sync {
    /// `GET /reels` - full collection, in feed order
    async fn fetch_reels(&self) -> Result<Vec<Reel>>;

    /// `POST /reels/:id/like` - toggle the caller's like, returns the updated reel
    async fn like_reel(&self, reel_id: &ReelId) -> Result<Reel>;

    /// `POST /reels/:id/bookmark` (save) or `DELETE /reels/:id/bookmark` (unsave)
    async fn set_bookmark(&self, reel_id: &ReelId, saved: bool) -> Result<BookmarkResponse>;

    /// `POST /reels/:id/report`
    async fn report_reel(&self, reel_id: &ReelId, report: &ReportRequest)
        -> Result<ReportResponse>;

    /// `DELETE /reels/:id` - author-only, enforced server-side
    async fn delete_reel(&self, reel_id: &ReelId) -> Result<OkResponse>;

    /// `POST /reels/:id/hide` - server-side record of a locally hidden reel
    async fn hide_reel(&self, reel_id: &ReelId) -> Result<OkResponse>;

    /// `POST /users/:id/mute` - server-side record of a locally muted author
    async fn mute_author(&self, author_id: &UserId) -> Result<OkResponse>;

    /// `GET /reels/:id/comments`
    async fn fetch_comments(&self, reel_id: &ReelId) -> Result<Vec<Comment>>;

    /// `POST /reels/:id/comments`
    async fn post_comment(&self, reel_id: &ReelId, comment: &CreateComment) -> Result<Comment>;

    /// `POST /reels/:id/comments/:commentId/like` - returns the updated comment
    async fn like_comment(&self, reel_id: &ReelId, comment_id: &CommentId) -> Result<Comment>;
}
