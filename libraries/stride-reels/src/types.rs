//! Core types for feed playback

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-slot playback status
///
/// `idle → loading → {ready | buffering} → playing ⇄ paused`, with
/// `loading`/`buffering` re-entrant while playing (network stalls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// No decode resource (never armed, released, or failed)
    Idle,

    /// Resource created, fetching first frame
    Loading,

    /// Stalled waiting for data
    Buffering,

    /// First frame ready, not playing
    Ready,

    /// Decoding and rendering
    Playing,

    /// Stopped mid-reel
    Paused,
}

impl SlotStatus {
    /// Whether a spinner should be shown
    pub fn is_waiting(&self) -> bool {
        matches!(self, SlotStatus::Loading | SlotStatus::Buffering)
    }
}

/// What the controller last asked a slot to do
///
/// Status callbacks are checked against this; a callback that contradicts
/// the current command is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotCommand {
    /// Resource released
    Release,

    /// Pre-armed for instant start, must not play
    Preload,

    /// Active and focused
    Play,

    /// Deactivated or screen unfocused
    Pause,
}

/// Configuration for the reels feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Minimum time an item must stay fully visible before it becomes active (default: 50)
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,

    /// Height of one list cell in pixels (default: 844)
    #[serde(default = "default_item_height_px")]
    pub item_height_px: f32,

    /// Initial global mute (default: false)
    #[serde(default)]
    pub start_muted: bool,

    /// Visible fraction that counts as fully on screen (default: 1.0)
    #[serde(default = "default_full_visibility_threshold")]
    pub full_visibility_threshold: f32,
}

impl FeedConfig {
    /// Dwell window as a `Duration`
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

fn default_dwell_ms() -> u64 {
    50
}

fn default_item_height_px() -> f32 {
    844.0
}

fn default_full_visibility_threshold() -> f32 {
    1.0
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            dwell_ms: default_dwell_ms(),
            item_height_px: default_item_height_px(),
            start_muted: false,
            full_visibility_threshold: default_full_visibility_threshold(),
        }
    }
}
