//! Core domain types for Stride
pub mod comment;
pub mod ids;
pub mod moderation;
pub mod reel;
pub mod user;

pub use comment::{Comment, CreateComment};
pub use ids::{CommentId, ReelId, UserId};
pub use moderation::{BookmarkResponse, OkResponse, ReportReason, ReportRequest, ReportResponse};
pub use reel::{ActivityType, Reel};
pub use user::CurrentUser;
