//! Viewport tracker
//!
//! Pure state machine over a `(reel, visible fraction, timestamp)` stream.
//! An item becomes active only after it has been continuously fully visible
//! for the dwell window, and never while a scroll gesture is in progress.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use stride_core::ReelId;
use tracing::debug;

/// Slack for float rounding in layout math; 99% visible must not count
const FULL_VISIBILITY_EPSILON: f32 = 1e-4;

/// An active-reel transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveChange {
    /// Previously active reel
    pub previous: Option<ReelId>,
    /// Newly active reel
    pub current: Option<ReelId>,
}

/// "Scroll the list to this index" command
///
/// Emitted whenever the tracker moves outside of a user gesture so the list
/// and the tracker stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    /// Target index in the visible list
    pub index: usize,
    /// Offset of that index in pixels
    pub offset_px: f32,
}

/// Snapshot of viewport state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Reel currently eligible to play
    pub active_reel_id: Option<ReelId>,
    /// Height of one list cell
    pub list_item_height_px: f32,
    /// Whether the feed screen has focus
    pub screen_focused: bool,
}

#[derive(Debug, Clone)]
struct Candidate {
    reel_id: ReelId,
    index: usize,
    since: Instant,
}

/// Tracks which visible item is active
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    active: Option<ReelId>,
    candidate: Option<Candidate>,
    dwell: Duration,
    full_threshold: f32,
    item_height_px: f32,
    screen_focused: bool,
    gesture_in_progress: bool,
}

impl ViewportTracker {
    /// Create a tracker for cells of `item_height_px`
    pub fn new(dwell: Duration, item_height_px: f32) -> Self {
        Self {
            active: None,
            candidate: None,
            dwell,
            full_threshold: 1.0,
            item_height_px,
            screen_focused: true,
            gesture_in_progress: false,
        }
    }

    /// Override the fraction treated as fully visible (clamped to `0.5..=1.0`)
    #[must_use]
    pub fn with_full_threshold(mut self, threshold: f32) -> Self {
        self.full_threshold = threshold.clamp(0.5, 1.0);
        self
    }

    /// Currently active reel
    pub fn active_reel_id(&self) -> Option<&ReelId> {
        self.active.as_ref()
    }

    /// Snapshot of the tracker state
    pub fn state(&self) -> ViewportState {
        ViewportState {
            active_reel_id: self.active.clone(),
            list_item_height_px: self.item_height_px,
            screen_focused: self.screen_focused,
        }
    }

    /// Cell height in pixels
    pub fn item_height_px(&self) -> f32 {
        self.item_height_px
    }

    /// Whether the feed screen has focus
    pub fn is_screen_focused(&self) -> bool {
        self.screen_focused
    }

    /// Record a focus change; returns `true` if it changed
    pub fn set_screen_focused(&mut self, focused: bool) -> bool {
        let changed = self.screen_focused != focused;
        self.screen_focused = focused;
        changed
    }

    /// Whether a gesture is in progress
    pub fn is_gesture_in_progress(&self) -> bool {
        self.gesture_in_progress
    }

    /// Finger down / fling started
    pub fn begin_gesture(&mut self) {
        self.gesture_in_progress = true;
    }

    /// Record one visibility sample
    ///
    /// A sample below the full threshold breaks the candidate's continuity.
    pub fn observe(&mut self, reel_id: &ReelId, index: usize, visible_fraction: f32, at: Instant) {
        let fully_visible = visible_fraction + FULL_VISIBILITY_EPSILON >= self.full_threshold;

        if fully_visible {
            let same = self
                .candidate
                .as_ref()
                .is_some_and(|c| &c.reel_id == reel_id);
            if same {
                if let Some(candidate) = self.candidate.as_mut() {
                    candidate.index = index;
                }
            } else {
                self.candidate = Some(Candidate {
                    reel_id: reel_id.clone(),
                    index,
                    since: at,
                });
            }
        } else if self
            .candidate
            .as_ref()
            .is_some_and(|c| &c.reel_id == reel_id)
        {
            self.candidate = None;
        }
    }

    /// Record one frame: every cell overlapping the viewport
    ///
    /// A candidate missing from the frame scrolled out entirely and loses
    /// its dwell.
    pub fn observe_frame(&mut self, samples: &[(usize, ReelId, f32)], at: Instant) {
        let candidate_gone = self
            .candidate
            .as_ref()
            .is_some_and(|c| !samples.iter().any(|(_, id, _)| id == &c.reel_id));
        if candidate_gone {
            self.candidate = None;
        }

        for (index, reel_id, fraction) in samples {
            self.observe(reel_id, *index, *fraction, at);
        }
    }

    /// The visible list changed: keep the candidate only if it is still
    /// listed, re-indexed to its new position
    pub fn retain_candidate(&mut self, position: impl Fn(&ReelId) -> Option<usize>) {
        let Some(candidate) = self.candidate.as_mut() else {
            return;
        };
        match position(&candidate.reel_id) {
            Some(index) => candidate.index = index,
            None => {
                debug!(reel_id = %candidate.reel_id, "Candidate left the visible list");
                self.candidate = None;
            }
        }
    }

    /// Scroll settled; evaluate the candidate
    pub fn settle(&mut self, at: Instant) -> Option<ActiveChange> {
        self.gesture_in_progress = false;
        self.poll(at)
    }

    /// Evaluate the candidate without a settle event (dwell timer tick)
    pub fn poll(&mut self, at: Instant) -> Option<ActiveChange> {
        if self.gesture_in_progress {
            return None;
        }

        let candidate = self.candidate.as_ref()?;
        if self.active.as_ref() == Some(&candidate.reel_id) {
            return None;
        }
        if at.saturating_duration_since(candidate.since) < self.dwell {
            return None;
        }

        let next = candidate.reel_id.clone();
        debug!(reel_id = %next, index = candidate.index, "Viewport settled on new reel");
        Some(self.transition(Some(next)))
    }

    /// Force the active item outside of scroll settling
    ///
    /// Used when the visible list is re-clamped, on orientation change, and
    /// for deep links. Returns the transition (if the id changed) and the
    /// scroll command the gesture would have produced.
    pub fn force(
        &mut self,
        target: Option<(usize, ReelId)>,
    ) -> (Option<ActiveChange>, Option<ScrollCommand>) {
        self.candidate = None;
        self.gesture_in_progress = false;

        match target {
            Some((index, reel_id)) => {
                let scroll = self.scroll_command(index);
                let change = if self.active.as_ref() == Some(&reel_id) {
                    None
                } else {
                    Some(self.transition(Some(reel_id)))
                };
                (change, Some(scroll))
            }
            None => {
                let change = self.active.is_some().then(|| self.transition(None));
                (change, None)
            }
        }
    }

    /// Orientation change: new cell height, re-issue the scroll for the active index
    pub fn set_item_height(
        &mut self,
        item_height_px: f32,
        active_index: Option<usize>,
    ) -> Option<ScrollCommand> {
        self.item_height_px = item_height_px.max(1.0);
        self.candidate = None;
        active_index.map(|index| self.scroll_command(index))
    }

    /// Scroll command for `index` at the current cell height
    pub fn scroll_command(&self, index: usize) -> ScrollCommand {
        ScrollCommand {
            index,
            offset_px: index as f32 * self.item_height_px,
        }
    }

    fn transition(&mut self, next: Option<ReelId>) -> ActiveChange {
        let previous = std::mem::replace(&mut self.active, next.clone());
        self.candidate = None;
        ActiveChange {
            previous,
            current: next,
        }
    }
}

/// Visible fraction of every cell overlapping the viewport
///
/// Cells are laid out back to back at `item_height_px`; returns
/// `(index, fraction)` pairs with `fraction` in `(0, 1]`.
pub fn visible_fractions(
    scroll_offset_px: f32,
    viewport_height_px: f32,
    item_height_px: f32,
    len: usize,
) -> Vec<(usize, f32)> {
    if len == 0 || item_height_px <= 0.0 || viewport_height_px <= 0.0 {
        return Vec::new();
    }

    let top = scroll_offset_px.max(0.0);
    let bottom = top + viewport_height_px;
    let first = (top / item_height_px).floor() as usize;
    let last = ((bottom / item_height_px).ceil() as usize).min(len);

    (first..last)
        .filter_map(|index| {
            let cell_top = index as f32 * item_height_px;
            let cell_bottom = cell_top + item_height_px;
            let overlap = cell_bottom.min(bottom) - cell_top.max(top);
            (overlap > 0.0).then(|| (index, (overlap / item_height_px).min(1.0)))
        })
        .collect()
}
