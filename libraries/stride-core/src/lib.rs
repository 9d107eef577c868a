//! Stride Core
//!
//! Platform-agnostic core types, traits, and error handling for Stride.
//!
//! This crate provides the foundational building blocks shared by the reels
//! playback core, the HTTP client, and the applications.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Reel`, `Comment`, `CurrentUser`, moderation requests
//! - **Core Traits**: `ReelsApi` (the backend collaborator)
//! - **Error Handling**: Unified `StrideError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use stride_core::types::{ActivityType, CurrentUser, Reel, ReelId, UserId};
//!
//! let me = CurrentUser::new(UserId::new("runner-1"));
//! let mut reel = Reel::new(
//!     ReelId::new("reel-1"),
//!     me.id.clone(),
//!     "https://cdn.example.com/reel-1.mp4",
//!     ActivityType::Run,
//! );
//!
//! assert!(reel.toggle_like(&me.id));
//! assert!(reel.is_liked_by(&me.id));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, StrideError};
pub use traits::ReelsApi;

pub use types::{
    ActivityType, BookmarkResponse, Comment, CommentId, CreateComment, CurrentUser, OkResponse,
    Reel, ReelId, ReportReason, ReportRequest, ReportResponse, UserId,
};
