//! Preload window
//!
//! Keeps a fixed number of neighbours around the active reel pre-armed so a
//! scroll in either direction starts without a load delay. The window never
//! grows with the feed, which bounds live decoders at `MAX_LIVE_RESOURCES`.

use serde::{Deserialize, Serialize};
use stride_core::ReelId;

/// Offsets from the active index that are pre-armed
pub const PRELOAD_OFFSETS: [isize; 3] = [-1, 1, 2];

/// Upper bound on concurrently instantiated decode resources
pub const MAX_LIVE_RESOURCES: usize = PRELOAD_OFFSETS.len() + 1;

/// Preload-eligible reels around an active index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadWindow {
    reel_ids: Vec<ReelId>,
}

impl PreloadWindow {
    /// Window around `active` in `visible`, clipped to the list bounds
    ///
    /// Empty when nothing is active.
    pub fn around(visible: &[ReelId], active: Option<usize>) -> Self {
        let Some(active) = active else {
            return Self::default();
        };

        let reel_ids = PRELOAD_OFFSETS
            .iter()
            .filter_map(|offset| active.checked_add_signed(*offset))
            .filter_map(|index| visible.get(index).cloned())
            .collect();

        Self { reel_ids }
    }

    /// Reels in the window, in offset order
    pub fn reel_ids(&self) -> &[ReelId] {
        &self.reel_ids
    }

    /// Whether `id` is in the window
    pub fn contains(&self, id: &ReelId) -> bool {
        self.reel_ids.contains(id)
    }

    /// Number of reels in the window
    pub fn len(&self) -> usize {
        self.reel_ids.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.reel_ids.is_empty()
    }
}

/// Remembers the current window
#[derive(Debug, Clone, Default)]
pub struct PreloadManager {
    window: PreloadWindow,
}

impl PreloadManager {
    /// Empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Current window
    pub fn window(&self) -> &PreloadWindow {
        &self.window
    }

    /// Recompute after a viewport transition or visible-list change
    ///
    /// Returns `true` if the window changed.
    pub fn recompute(&mut self, visible: &[ReelId], active: Option<usize>) -> bool {
        let next = PreloadWindow::around(visible, active);
        if next == self.window {
            return false;
        }
        self.window = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[&str]) -> Vec<ReelId> {
        ids.iter().map(|s| ReelId::new(*s)).collect()
    }

    fn names(window: &PreloadWindow) -> Vec<&str> {
        window.reel_ids().iter().map(ReelId::as_str).collect()
    }

    #[test]
    fn window_around_middle() {
        let visible = list(&["a", "b", "c", "d", "e"]);
        let window = PreloadWindow::around(&visible, Some(2));
        assert_eq!(names(&window), vec!["b", "d", "e"]);
    }

    #[test]
    fn window_clipped_at_edges() {
        let visible = list(&["a", "b", "c"]);
        assert_eq!(names(&PreloadWindow::around(&visible, Some(0))), vec!["b", "c"]);
        assert_eq!(names(&PreloadWindow::around(&visible, Some(2))), vec!["b"]);
        assert!(PreloadWindow::around(&visible, None).is_empty());
        assert!(PreloadWindow::around(&[], Some(0)).is_empty());
    }

    #[test]
    fn window_size_is_fixed() {
        let visible: Vec<ReelId> = (0..1000).map(|i| ReelId::new(i.to_string())).collect();
        let window = PreloadWindow::around(&visible, Some(500));
        assert_eq!(window.len(), PRELOAD_OFFSETS.len());
        assert_eq!(MAX_LIVE_RESOURCES, 4);
    }

    #[test]
    fn manager_reports_changes() {
        let visible = list(&["a", "b", "c", "d", "e"]);
        let mut manager = PreloadManager::new();

        assert!(manager.recompute(&visible, Some(2)));
        assert!(!manager.recompute(&visible, Some(2)));

        let shrunk = list(&["a", "b", "c", "e"]);
        assert!(manager.recompute(&shrunk, Some(2)));
        assert_eq!(names(manager.window()), vec!["b", "e"]);
    }
}
