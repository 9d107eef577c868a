//! Reel Feed
//!
//! Wires the store, visibility filter, viewport tracker, playback controller
//! and preload window together. Every input funnels through here so the
//! ordering holds: viewport transition first, then the preload window and
//! the controller, never the other way round.

use crate::comments::CommentThread;
use crate::controller::PlaybackController;
use crate::error::{FeedError, Result};
use crate::events::FeedEvent;
use crate::preload::{PreloadManager, PreloadWindow};
use crate::resource::{MediaResourceFactory, ResourceEvent};
use crate::slot::SlotView;
use crate::store::ReelStore;
use crate::types::FeedConfig;
use crate::viewport::{visible_fractions, ActiveChange, ScrollCommand, ViewportState, ViewportTracker};
use crate::visibility::{VisibilitySets, VisibleReels};
use std::sync::Arc;
use std::time::Instant;
use stride_core::{CurrentUser, Reel, ReelId, StrideError, UserId};
use tracing::{debug, info};

/// The reels feed
pub struct ReelFeed {
    viewer: CurrentUser,
    store: ReelStore,
    sets: VisibilitySets,
    visible: VisibleReels,
    viewport: ViewportTracker,
    controller: PlaybackController,
    preload: PreloadManager,
    pending_events: Vec<FeedEvent>,
}

impl std::fmt::Debug for ReelFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReelFeed")
            .field("viewer", &self.viewer.id)
            .field("reels", &self.store.len())
            .field("visible", &self.visible.len())
            .field("active", &self.viewport.active_reel_id())
            .finish_non_exhaustive()
    }
}

impl ReelFeed {
    /// Create an empty feed for `viewer`
    pub fn new(
        config: &FeedConfig,
        viewer: CurrentUser,
        factory: Box<dyn MediaResourceFactory>,
    ) -> Self {
        Self {
            viewer,
            store: ReelStore::new(),
            sets: VisibilitySets::new(),
            visible: VisibleReels::new(),
            viewport: ViewportTracker::new(config.dwell(), config.item_height_px)
                .with_full_threshold(config.full_visibility_threshold),
            controller: PlaybackController::new(factory, config.start_muted),
            preload: PreloadManager::new(),
            pending_events: Vec::new(),
        }
    }

    // ===== Content =====

    /// Apply a successful `load()`
    pub fn replace_reels(&mut self, reels: Vec<Reel>) {
        info!(count = reels.len(), "Feed loaded");
        self.store.replace_all(reels);
        self.refresh_reels();
    }

    /// Replace the follow graph
    pub fn set_following(&mut self, authors: impl IntoIterator<Item = UserId>) {
        self.viewer.following = authors.into_iter().collect();
        self.refresh_visible();
    }

    /// Drop a reel after a confirmed delete
    pub fn remove_reel(&mut self, id: &ReelId) -> Option<Reel> {
        let removed = self.store.remove(id)?;
        self.refresh_visible();
        Some(removed)
    }

    /// Insert or replace a single reel (server push, edit)
    pub fn upsert_reel(&mut self, reel: Reel) {
        self.store.upsert(reel);
        self.refresh_reels();
    }

    // ===== Moderation =====

    /// Hide a reel for this session
    pub fn hide_reel(&mut self, id: &ReelId) -> bool {
        let changed = self.sets.hide_reel(id.clone());
        if changed {
            self.refresh_visible();
        }
        changed
    }

    /// Mute an author for this session
    pub fn mute_author(&mut self, author: &UserId) -> bool {
        let changed = self.sets.mute_author(author.clone());
        if changed {
            self.refresh_visible();
        }
        changed
    }

    /// Exclude a reported reel
    pub fn report_reel(&mut self, id: &ReelId) -> bool {
        let changed = self.sets.report_reel(id.clone());
        if changed {
            self.refresh_visible();
        }
        changed
    }

    /// Explicit unhide
    pub fn unhide_reel(&mut self, id: &ReelId) -> bool {
        let changed = self.sets.unhide_reel(id);
        if changed {
            self.refresh_visible();
        }
        changed
    }

    /// Explicit unmute
    pub fn unmute_author(&mut self, author: &UserId) -> bool {
        let changed = self.sets.unmute_author(author);
        if changed {
            self.refresh_visible();
        }
        changed
    }

    /// Reel contents changed: slots must see edited media even when the
    /// visible ids did not move
    fn refresh_reels(&mut self) {
        if !self.refresh_visible() {
            self.sync_playback(None);
        }
    }

    /// Re-derive the visible list and re-clamp the active pointer
    ///
    /// Returns `false` if the list was unchanged and nothing was done.
    ///
    /// If the active reel is still visible it stays active. Otherwise the
    /// pointer moves to `min(previous index, len - 1)`, or to nothing when
    /// the list is empty. The controller is told in the same call.
    fn refresh_visible(&mut self) -> bool {
        let previous_ids = Arc::clone(self.visible.ids());
        let changed = self
            .visible
            .refresh(self.store.reels(), &self.viewer, &self.sets);
        if !changed {
            return false;
        }
        let visible = &self.visible;
        self.viewport.retain_candidate(|id| visible.position(id));
        self.pending_events.push(FeedEvent::VisibleListChanged {
            len: self.visible.len(),
        });

        let Some(active) = self.viewport.active_reel_id().cloned() else {
            self.sync_playback(None);
            return true;
        };
        let previous_index = previous_ids.iter().position(|id| *id == active);

        if let Some(index) = self.visible.position(&active) {
            if previous_index != Some(index) {
                let (_, scroll) = self.viewport.force(Some((index, active)));
                self.push_scroll(scroll);
            }
            self.sync_playback(None);
            return true;
        }

        let target = match (self.visible.len(), previous_index) {
            (0, _) => None,
            (len, index) => {
                let index = index.unwrap_or(0).min(len - 1);
                self.visible.get(index).cloned().map(|id| (index, id))
            }
        };
        debug!(reel_id = %active, target = ?target, "Active reel filtered out, re-clamping");

        let (change, scroll) = self.viewport.force(target);
        self.push_scroll(scroll);
        match change {
            Some(change) => self.apply_transition(change),
            None => self.sync_playback(None),
        }
        true
    }

    // ===== Viewport =====

    /// Scroll position changed; samples every cell on screen
    pub fn on_scroll(&mut self, scroll_offset_px: f32, viewport_height_px: f32, at: Instant) {
        let samples: Vec<(usize, ReelId, f32)> = visible_fractions(
            scroll_offset_px,
            viewport_height_px,
            self.viewport.item_height_px(),
            self.visible.len(),
        )
        .into_iter()
        .filter_map(|(index, fraction)| {
            self.visible
                .get(index)
                .map(|id| (index, id.clone(), fraction))
        })
        .collect();

        self.viewport.observe_frame(&samples, at);
    }

    /// Single visibility sample from the list widget
    pub fn observe(&mut self, reel_id: &ReelId, visible_fraction: f32, at: Instant) {
        match self.visible.position(reel_id) {
            Some(index) => self.viewport.observe(reel_id, index, visible_fraction, at),
            None => debug!(reel_id = %reel_id, "Sample for a reel outside the visible list"),
        }
    }

    /// Finger down or fling started
    pub fn begin_gesture(&mut self) {
        self.viewport.begin_gesture();
    }

    /// Scroll settled
    pub fn settle(&mut self, at: Instant) -> Option<ActiveChange> {
        let change = self.viewport.settle(at)?;
        self.apply_transition(change.clone());
        Some(change)
    }

    /// Dwell timer tick
    pub fn poll(&mut self, at: Instant) -> Option<ActiveChange> {
        let change = self.viewport.poll(at)?;
        self.apply_transition(change.clone());
        Some(change)
    }

    /// Deep link: make `id` active and scroll to it
    pub fn navigate_to(&mut self, id: &ReelId) -> Result<ScrollCommand> {
        let index = self
            .visible
            .position(id)
            .ok_or_else(|| FeedError::ReelNotFound(id.clone()))?;

        let (change, scroll) = self.viewport.force(Some((index, id.clone())));
        let scroll = scroll.unwrap_or_else(|| self.viewport.scroll_command(index));
        self.pending_events.push(FeedEvent::ScrollTo(scroll));
        if let Some(change) = change {
            self.apply_transition(change);
        }
        Ok(scroll)
    }

    /// Orientation change
    pub fn set_item_height(&mut self, item_height_px: f32) -> Option<ScrollCommand> {
        let index = self.active_index();
        let scroll = self.viewport.set_item_height(item_height_px, index);
        self.push_scroll(scroll);
        scroll
    }

    fn push_scroll(&mut self, scroll: Option<ScrollCommand>) {
        if let Some(scroll) = scroll {
            self.pending_events.push(FeedEvent::ScrollTo(scroll));
        }
    }

    fn apply_transition(&mut self, change: ActiveChange) {
        info!(
            previous = ?change.previous.as_ref().map(ReelId::as_str),
            current = ?change.current.as_ref().map(ReelId::as_str),
            "Active reel changed"
        );
        let previous = change.previous.clone();
        self.pending_events.push(FeedEvent::ActiveChanged {
            previous: change.previous,
            current: change.current,
        });
        self.sync_playback(previous.as_ref());
    }

    /// Recompute the preload window and hand it to the controller
    fn sync_playback(&mut self, previous: Option<&ReelId>) {
        let active_index = self.active_index();
        let window_changed = self.preload.recompute(self.visible.ids(), active_index);

        let active = self
            .viewport
            .active_reel_id()
            .and_then(|id| self.store.get(id));
        let preload: Vec<&Reel> = self
            .preload
            .window()
            .reel_ids()
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect();

        self.controller.reconcile(previous, active, &preload);
        self.pending_events.extend(self.controller.drain_events());

        if window_changed {
            self.pending_events.push(FeedEvent::PreloadWindowChanged {
                reel_ids: self.preload.window().reel_ids().to_vec(),
            });
        }
    }

    // ===== Playback inputs =====

    /// Set the global mute switch
    pub fn set_muted(&mut self, muted: bool) {
        self.controller.set_muted(muted);
        self.pending_events.extend(self.controller.drain_events());
    }

    /// Flip the global mute switch; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.controller.is_muted();
        self.set_muted(muted);
        muted
    }

    /// Whether audio is muted
    pub fn is_muted(&self) -> bool {
        self.controller.is_muted()
    }

    /// Feed screen gained or lost focus
    pub fn set_screen_focused(&mut self, focused: bool) {
        self.viewport.set_screen_focused(focused);
        self.controller.set_screen_focused(focused);
        self.pending_events.extend(self.controller.drain_events());
    }

    /// Status callback from a decode resource
    pub fn on_resource_event(&mut self, reel_id: &ReelId, event: ResourceEvent) {
        self.controller.on_resource_event(reel_id, event);
        self.pending_events.extend(self.controller.drain_events());
    }

    /// Retry a reel whose media failed to decode
    pub fn retry(&mut self, reel_id: &ReelId) -> Result<()> {
        let reel = self
            .store
            .get(reel_id)
            .ok_or_else(|| FeedError::ReelNotFound(reel_id.clone()))?;
        self.controller.retry(reel)?;
        self.pending_events.extend(self.controller.drain_events());
        Ok(())
    }

    /// Feed unmounted: release every decoder
    pub fn unmount(&mut self) {
        self.controller.release_all();
        self.pending_events.extend(self.controller.drain_events());
    }

    // ===== Likes & bookmarks =====

    /// Optimistic like toggle for the current user
    ///
    /// `None` means a request for this reel is already in flight and the
    /// tap was coalesced.
    pub fn begin_toggle_like(&mut self, id: &ReelId) -> Result<Option<bool>> {
        self.store.begin_toggle_like(id, &self.viewer.id)
    }

    /// Reconcile a like request
    pub fn finish_like(&mut self, id: &ReelId, outcome: std::result::Result<Reel, StrideError>) {
        self.store.finish_like(id, outcome);
    }

    /// Optimistic bookmark toggle
    pub fn begin_toggle_bookmark(&mut self, id: &ReelId) -> Result<Option<bool>> {
        self.store.begin_toggle_bookmark(id)
    }

    /// Reconcile a bookmark request
    pub fn finish_bookmark(
        &mut self,
        id: &ReelId,
        outcome: std::result::Result<Vec<ReelId>, StrideError>,
    ) {
        self.store.finish_bookmark(id, outcome);
    }

    /// Keep the reel's comment counter in step with an open thread
    pub fn sync_comment_count(&mut self, thread: &CommentThread) {
        self.store.sync_comment_count(thread.reel_id(), thread.len());
    }

    /// Bump the comment counter after a post
    pub fn record_comment_added(&mut self, id: &ReelId) {
        self.store.record_comment_added(id);
    }

    // ===== Queries =====

    /// Reel currently eligible to play
    pub fn active_reel_id(&self) -> Option<&ReelId> {
        self.viewport.active_reel_id()
    }

    /// Index of the active reel in the visible list
    pub fn active_index(&self) -> Option<usize> {
        self.viewport
            .active_reel_id()
            .and_then(|id| self.visible.position(id))
    }

    /// Active reel
    pub fn active_reel(&self) -> Option<&Reel> {
        self.active_reel_id().and_then(|id| self.store.get(id))
    }

    /// Visible list (identity is stable across no-op refreshes)
    pub fn visible_ids(&self) -> &Arc<[ReelId]> {
        self.visible.ids()
    }

    /// Visible reels in order
    pub fn visible_reels(&self) -> Vec<&Reel> {
        self.visible
            .ids()
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    /// Current preload window
    pub fn preload_window(&self) -> &PreloadWindow {
        self.preload.window()
    }

    /// Viewport snapshot
    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    /// Slot snapshot for rendering a cell
    pub fn slot_view(&self, id: &ReelId) -> Option<SlotView> {
        self.controller.slot(id).map(|slot| slot.view())
    }

    /// The underlying store
    pub fn store(&self) -> &ReelStore {
        &self.store
    }

    /// Session exclusion sets
    pub fn visibility(&self) -> &VisibilitySets {
        &self.sets
    }

    /// Current user
    pub fn viewer(&self) -> &CurrentUser {
        &self.viewer
    }

    /// The playback controller
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<FeedEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeMediaFactory, FakeMediaLog};
    use crate::types::SlotStatus;
    use std::time::Duration;
    use stride_core::ActivityType;

    fn reel(id: &str, author: &str) -> Reel {
        Reel::new(
            ReelId::new(id),
            UserId::new(author),
            format!("https://cdn/{id}.mp4"),
            ActivityType::Run,
        )
    }

    fn feed(reels: Vec<Reel>) -> (ReelFeed, FakeMediaLog) {
        let factory = FakeMediaFactory::new();
        let log = factory.log();
        let viewer = CurrentUser::with_following(
            UserId::new("me"),
            ["ana", "bo", "cy"].into_iter().map(UserId::new),
        );
        let mut feed = ReelFeed::new(&FeedConfig::default(), viewer, Box::new(factory));
        feed.replace_reels(reels);
        (feed, log)
    }

    fn settle_on(feed: &mut ReelFeed, index: usize, t0: Instant) {
        let height = feed.viewport_state().list_item_height_px;
        feed.begin_gesture();
        feed.on_scroll(index as f32 * height, height, t0);
        feed.settle(t0 + Duration::from_millis(60));
    }

    #[test]
    fn scroll_settle_activates_and_preloads() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo"), reel("c", "cy")]);
        let t0 = Instant::now();

        feed.on_scroll(0.0, 844.0, t0);
        assert!(feed.settle(t0).is_none());
        assert!(feed.poll(t0 + Duration::from_millis(50)).is_some());

        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("a")));
        assert_eq!(feed.preload_window().len(), 2);
        assert_eq!(log.live(), 3);
        assert!(log.is_playing(&ReelId::new("a")));
    }

    #[test]
    fn hiding_active_reel_clamps_forward() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo"), reel("c", "cy")]);
        settle_on(&mut feed, 1, Instant::now());
        feed.drain_events();

        feed.hide_reel(&ReelId::new("b"));
        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("c")));
        assert!(!log.is_playing(&ReelId::new("b")));
        assert!(log.is_playing(&ReelId::new("c")));

        let events = feed.drain_events();
        assert!(events.contains(&FeedEvent::ScrollTo(ScrollCommand {
            index: 1,
            offset_px: 844.0,
        })));
    }

    #[test]
    fn hidden_candidate_never_becomes_active() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo"), reel("c", "cy")]);
        let t0 = Instant::now();
        feed.navigate_to(&ReelId::new("a")).unwrap();

        feed.begin_gesture();
        feed.on_scroll(844.0, 844.0, t0);
        feed.hide_reel(&ReelId::new("b"));

        assert!(feed.settle(t0 + Duration::from_millis(60)).is_none());
        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("a")));
        assert!(log.is_playing(&ReelId::new("a")));
        assert!(!log.is_playing(&ReelId::new("b")));
        assert!(feed.slot_view(&ReelId::new("b")).is_none());
        assert_eq!(log.playing_count(), 1);
    }

    #[test]
    fn edited_media_uri_reaches_the_active_slot() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo")]);
        let a = ReelId::new("a");
        feed.navigate_to(&a).unwrap();

        let mut edited = feed.active_reel().unwrap().clone();
        edited.media_uri = "https://cdn/a-v2.mp4".into();
        feed.upsert_reel(edited);

        assert_eq!(feed.controller().slot(&a).unwrap().media_uri(), "https://cdn/a-v2.mp4");
        assert!(log.is_playing(&a));
        assert_eq!(log.live(), 2);
    }

    #[test]
    fn hiding_last_reel_clamps_backward() {
        let (mut feed, _log) = feed(vec![reel("a", "ana"), reel("b", "bo")]);
        settle_on(&mut feed, 1, Instant::now());

        feed.hide_reel(&ReelId::new("b"));
        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("a")));
        assert_eq!(feed.active_index(), Some(0));
    }

    #[test]
    fn emptying_the_list_clears_active() {
        let (mut feed, log) = feed(vec![reel("a", "ana")]);
        settle_on(&mut feed, 0, Instant::now());

        feed.mute_author(&UserId::new("ana"));
        assert!(feed.active_reel_id().is_none());
        assert_eq!(log.live(), 0);
        assert_eq!(feed.controller().playing_count(), 0);
    }

    #[test]
    fn unfollowed_authors_are_filtered() {
        let (mut feed, _log) = feed(vec![reel("a", "ana"), reel("x", "stranger"), reel("m", "me")]);
        assert_eq!(feed.visible_ids().len(), 2);

        feed.set_following([UserId::new("stranger")]);
        let ids: Vec<_> = feed.visible_ids().iter().map(ReelId::as_str).collect();
        assert_eq!(ids, vec!["x", "m"]);
    }

    #[test]
    fn deep_link_scrolls_and_plays() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo"), reel("c", "cy")]);

        let scroll = feed.navigate_to(&ReelId::new("c")).unwrap();
        assert_eq!(scroll.index, 2);
        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("c")));
        assert!(log.is_playing(&ReelId::new("c")));

        assert!(matches!(
            feed.navigate_to(&ReelId::new("nope")),
            Err(FeedError::ReelNotFound(_))
        ));
    }

    #[test]
    fn orientation_change_reissues_scroll() {
        let (mut feed, _log) = feed(vec![reel("a", "ana"), reel("b", "bo")]);
        feed.navigate_to(&ReelId::new("b")).unwrap();
        feed.drain_events();

        let scroll = feed.set_item_height(400.0).unwrap();
        assert_eq!(scroll.offset_px, 400.0);
        assert_eq!(feed.drain_events(), vec![FeedEvent::ScrollTo(scroll)]);
    }

    #[test]
    fn removing_active_reel_reevaluates() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo")]);
        feed.navigate_to(&ReelId::new("a")).unwrap();

        assert!(feed.remove_reel(&ReelId::new("a")).is_some());
        assert_eq!(feed.active_reel_id(), Some(&ReelId::new("b")));
        assert!(log.is_playing(&ReelId::new("b")));
    }

    #[test]
    fn toggle_mute_reaches_slots() {
        let (mut feed, log) = feed(vec![reel("a", "ana"), reel("b", "bo")]);
        feed.navigate_to(&ReelId::new("a")).unwrap();

        assert!(feed.toggle_mute());
        assert!(log.is_muted(&ReelId::new("a")));
        assert!(log.is_muted(&ReelId::new("b")));
        assert!(feed.slot_view(&ReelId::new("a")).unwrap().muted);
    }

    #[test]
    fn retry_after_decode_failure() {
        let (mut feed, _log) = feed(vec![reel("a", "ana")]);
        let a = ReelId::new("a");
        feed.navigate_to(&a).unwrap();
        feed.on_resource_event(&a, ResourceEvent::Failed("eof".into()));
        assert_eq!(feed.slot_view(&a).unwrap().status, SlotStatus::Idle);

        feed.retry(&a).unwrap();
        assert_eq!(feed.slot_view(&a).unwrap().status, SlotStatus::Loading);
        assert!(feed.slot_view(&a).unwrap().error.is_none());
    }
}
