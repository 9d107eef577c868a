/// In-memory backend loaded from a JSON fixture
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use stride_core::{
    BookmarkResponse, Comment, CommentId, CreateComment, OkResponse, Reel, ReelId, ReelsApi,
    ReportRequest, ReportResponse, StrideError, UserId,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    reels: Vec<Reel>,

    #[serde(default)]
    comments: Vec<Comment>,
}

#[derive(Debug, Default)]
struct FixtureState {
    reels: Vec<Reel>,
    comments: Vec<Comment>,
    saved: BTreeSet<ReelId>,
}

impl FixtureState {
    fn reel_mut(&mut self, id: &ReelId) -> stride_core::Result<&mut Reel> {
        self.reels
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StrideError::not_found("reel", id.as_str()))
    }
}

/// `ReelsApi` over a fixture file
///
/// Mutations (likes, comments, deletes) are kept in memory for the lifetime
/// of the process and acted out as `viewer`.
pub struct FixtureApi {
    viewer: UserId,
    state: Mutex<FixtureState>,
}

impl FixtureApi {
    pub fn from_path(path: &Path, viewer: UserId) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let api = Self::from_json(&json, viewer)?;
        info!(path = %path.display(), "Loaded fixture");
        Ok(api)
    }

    pub fn from_json(json: &str, viewer: UserId) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;
        Ok(Self {
            viewer,
            state: Mutex::new(FixtureState {
                reels: file.reels,
                comments: file.comments,
                saved: BTreeSet::new(),
            }),
        })
    }
}

#[async_trait]
impl ReelsApi for FixtureApi {
    async fn fetch_reels(&self) -> stride_core::Result<Vec<Reel>> {
        Ok(self.state.lock().await.reels.clone())
    }

    async fn like_reel(&self, reel_id: &ReelId) -> stride_core::Result<Reel> {
        let mut state = self.state.lock().await;
        let reel = state.reel_mut(reel_id)?;
        reel.toggle_like(&self.viewer);
        Ok(reel.clone())
    }

    async fn set_bookmark(
        &self,
        reel_id: &ReelId,
        saved: bool,
    ) -> stride_core::Result<BookmarkResponse> {
        let mut state = self.state.lock().await;
        state.reel_mut(reel_id)?;
        if saved {
            state.saved.insert(reel_id.clone());
        } else {
            state.saved.remove(reel_id);
        }
        Ok(BookmarkResponse {
            saved_reels: state.saved.iter().cloned().collect(),
        })
    }

    async fn report_reel(
        &self,
        reel_id: &ReelId,
        report: &ReportRequest,
    ) -> stride_core::Result<ReportResponse> {
        debug!(reel_id = %reel_id, reason = ?report.reason, "Fixture report");
        Ok(ReportResponse {
            ok: true,
            message: None,
        })
    }

    async fn delete_reel(&self, reel_id: &ReelId) -> stride_core::Result<OkResponse> {
        let mut state = self.state.lock().await;
        let author = state.reel_mut(reel_id)?.author_id.clone();
        if author != self.viewer {
            return Err(StrideError::PermissionDenied(format!(
                "{} is not the author of {}",
                self.viewer, reel_id
            )));
        }
        state.reels.retain(|r| &r.id != reel_id);
        state.comments.retain(|c| &c.reel_id != reel_id);
        Ok(OkResponse { ok: true })
    }

    async fn hide_reel(&self, reel_id: &ReelId) -> stride_core::Result<OkResponse> {
        self.state.lock().await.reel_mut(reel_id)?;
        Ok(OkResponse { ok: true })
    }

    async fn mute_author(&self, _author_id: &UserId) -> stride_core::Result<OkResponse> {
        Ok(OkResponse { ok: true })
    }

    async fn fetch_comments(&self, reel_id: &ReelId) -> stride_core::Result<Vec<Comment>> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| &c.reel_id == reel_id)
            .cloned()
            .collect())
    }

    async fn post_comment(
        &self,
        reel_id: &ReelId,
        comment: &CreateComment,
    ) -> stride_core::Result<Comment> {
        let text = comment.text.trim();
        if text.is_empty() {
            return Err(StrideError::invalid_input("comment text cannot be empty"));
        }

        let mut state = self.state.lock().await;
        state.reel_mut(reel_id)?.increment_comments();

        let created = Comment {
            id: CommentId::generate(),
            reel_id: reel_id.clone(),
            author_id: self.viewer.clone(),
            text: text.to_string(),
            parent_id: comment.parent_id.clone(),
            liked_user_ids: BTreeSet::new(),
            created_at: Utc::now(),
        };
        state.comments.push(created.clone());
        Ok(created)
    }

    async fn like_comment(
        &self,
        reel_id: &ReelId,
        comment_id: &CommentId,
    ) -> stride_core::Result<Comment> {
        let mut state = self.state.lock().await;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| &c.id == comment_id && &c.reel_id == reel_id)
            .ok_or_else(|| StrideError::not_found("comment", comment_id.as_str()))?;
        comment.toggle_like(&self.viewer);
        Ok(comment.clone())
    }
}
