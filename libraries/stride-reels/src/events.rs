//! Feed Events
//!
//! Event-based communication for UI synchronization. Events are queued as
//! the feed changes and drained by the UI once per frame:
//! - Active reel transitions and the scroll command that goes with them
//! - Slot status changes (spinners, play/pause overlays)
//! - Visible list and preload window recomputation
//! - Global mute and screen focus

use crate::types::SlotStatus;
use crate::viewport::ScrollCommand;
use serde::{Deserialize, Serialize};
use stride_core::ReelId;

/// Events emitted by the reels feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    /// The active reel changed
    ActiveChanged {
        /// Previously active reel
        previous: Option<ReelId>,
        /// Newly active reel (`None` when the visible list is empty)
        current: Option<ReelId>,
    },

    /// The list must scroll so tracker and list agree
    ///
    /// Emitted for forced transitions only (re-clamp, orientation change,
    /// deep link); a user gesture already put the list where it is.
    ScrollTo(ScrollCommand),

    /// A slot's status changed
    SlotStatusChanged {
        /// Reel the slot plays
        reel_id: ReelId,
        /// New status
        status: SlotStatus,
    },

    /// A reel's media failed to decode; the slot is idle until retried
    DecodeFailed {
        /// Reel whose media failed
        reel_id: ReelId,
        /// Decoder message
        message: String,
    },

    /// The visible list was re-derived and changed
    VisibleListChanged {
        /// New length
        len: usize,
    },

    /// Preload window recomputed
    PreloadWindowChanged {
        /// Reels now pre-armed
        reel_ids: Vec<ReelId>,
    },

    /// Global mute toggled
    MuteChanged {
        /// Whether audio is muted
        muted: bool,
    },

    /// Feed screen gained or lost focus
    FocusChanged {
        /// Whether the feed screen has focus
        focused: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = FeedEvent::SlotStatusChanged {
            reel_id: ReelId::new("r1"),
            status: SlotStatus::Playing,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"SlotStatusChanged":{"reel_id":"r1","status":"playing"}}"#
        );
    }
}
