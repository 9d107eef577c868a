//! Stride Server Client
//!
//! HTTP client library for the Stride reels backend.
//!
//! # Features
//!
//! - **Feed**: Fetch the full reel collection
//! - **Interactions**: Likes, bookmarks, comments and comment likes
//! - **Moderation**: Report, hide and mute, plus author-only delete
//!
//! The client implements `stride_core::ReelsApi`; transport errors are
//! mapped onto `StrideError` at that boundary.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stride_server_client::{ServerConfig, StrideClient};
//! use stride_reels::{FeedConfig, FeedSession, ReelFeed};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StrideClient::new(ServerConfig::with_token("https://api.stride.example", "token"))?;
//!     let feed = ReelFeed::new(&FeedConfig::default(), viewer, factory);
//!
//!     let mut session = FeedSession::new(feed, Arc::new(client));
//!     let count = session.load().await?;
//!     println!("Loaded {count} reels");
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

// Re-export main types
pub use client::StrideClient;
pub use error::{Result, ServerClientError};
pub use types::ServerConfig;
