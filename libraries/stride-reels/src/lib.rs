//! Stride - Reels Feed Playback
//!
//! Platform-agnostic playback core for the short-form video feed.
//!
//! This crate provides:
//! - Reel store with optimistic likes and bookmarks
//! - Visibility filter (follow graph, hidden reels, muted authors, reports)
//! - Viewport tracker (100%-visible-for-dwell activation, no mid-gesture flicker)
//! - Playback controller (one playing slot, immediate rewind on deactivation)
//! - Preload window (`active-1`, `active+1`, `active+2`; at most 4 live decoders)
//! - Comments overlay with one level of threaded replies
//!
//! # Architecture
//!
//! `stride-reels` knows nothing about the platform video player or the UI
//! toolkit. Decoders are provided through the `MediaResource` traits and the
//! UI drains `FeedEvent`s. All state is single-owner (`&mut self`); the only
//! async code is `FeedSession`, which talks to the backend via `ReelsApi`.
//!
//! # Example: Scrolling the feed
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use stride_core::{ActivityType, CurrentUser, Reel, ReelId, UserId};
//! use stride_reels::test_utils::FakeMediaFactory;
//! use stride_reels::{FeedConfig, ReelFeed};
//!
//! let me = CurrentUser::new(UserId::new("me"));
//! let reels = ["a", "b", "c"]
//!     .into_iter()
//!     .map(|id| Reel::new(ReelId::new(id), me.id.clone(), format!("https://cdn/{id}.mp4"), ActivityType::Run))
//!     .collect();
//!
//! let mut feed = ReelFeed::new(&FeedConfig::default(), me, Box::new(FakeMediaFactory::new()));
//! feed.replace_reels(reels);
//!
//! // The list reports cell 1 fully on screen, then the scroll settles
//! let t0 = Instant::now();
//! feed.begin_gesture();
//! feed.on_scroll(844.0, 844.0, t0);
//! feed.settle(t0 + Duration::from_millis(60));
//!
//! assert_eq!(feed.active_reel_id(), Some(&ReelId::new("b")));
//! for event in feed.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

pub mod comments;
mod controller;
mod error;
pub mod events;
mod feed;
pub mod preload;
mod resource;
mod session;
mod slot;
mod store;
pub mod test_utils;
pub mod types;
mod viewport;
pub mod visibility;

// Public exports
pub use comments::{CommentRow, CommentThread};
pub use controller::PlaybackController;
pub use error::{FeedError, Result};
pub use events::FeedEvent;
pub use feed::ReelFeed;
pub use preload::{PreloadManager, PreloadWindow, MAX_LIVE_RESOURCES, PRELOAD_OFFSETS};
pub use resource::{MediaResource, MediaResourceFactory, ResourceEvent};
pub use session::FeedSession;
pub use slot::{PlaybackSlot, SlotView};
pub use store::ReelStore;
pub use types::{FeedConfig, SlotCommand, SlotStatus};
pub use viewport::{visible_fractions, ActiveChange, ScrollCommand, ViewportState, ViewportTracker};
pub use visibility::{filter_visible, is_visible, VisibilitySets, VisibleReels};
