//! Platform-agnostic decode resource traits
//!
//! Abstracts the platform video player (AVPlayer, ExoPlayer, a GStreamer
//! pipeline, ...) so the controller can schedule playback without knowing
//! the transport or codec.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use stride_core::ReelId;

/// One live decode resource
///
/// Implementors own a platform decoder for a single media URI. All calls are
/// commands; the resource reports progress back through `ResourceEvent`s
/// delivered to the controller on the same event loop.
pub trait MediaResource: Send {
    /// Start fetching and decode the first frame, without playing
    fn prepare(&mut self) -> Result<()>;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Stop producing audio/video, keeping the position
    fn pause(&mut self);

    /// Move the playback position back to the start
    fn seek_to_start(&mut self);

    /// Apply the global mute switch
    fn set_muted(&mut self, muted: bool);

    /// Tear down the decoder
    ///
    /// Called before the resource is dropped. Default does nothing.
    fn release(&mut self) {}
}

/// Creates decode resources on demand
pub trait MediaResourceFactory: Send {
    /// Instantiate a resource for `media_uri`
    fn create(&mut self, reel_id: &ReelId, media_uri: &str) -> Result<Box<dyn MediaResource>>;
}

/// Status callback from a decode resource
///
/// Advisory only: these drive the UI status of a slot and never start or
/// stop playback themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceEvent {
    /// Fetching initial data
    Loading,
    /// Stalled mid-playback
    Buffering,
    /// First frame (or enough data to continue) available
    Ready,
    /// Playback position as a fraction of the duration
    Progress(f32),
    /// Decoder failed
    Failed(String),
}
