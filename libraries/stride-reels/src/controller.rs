//! Playback Controller
//!
//! Exclusively owns every `PlaybackSlot` and is the only component that
//! starts or stops decoding. Slots are keyed by reel id so they survive the
//! index shifts caused by visible-list changes.
//!
//! The controller keeps two invariants:
//! - at most one slot is commanded to play (the active one, and only while
//!   the screen is focused)
//! - live decode resources never exceed the active slot plus the preload
//!   window, because `reconcile` releases before it arms

use crate::error::FeedError;
use crate::events::FeedEvent;
use crate::resource::{MediaResourceFactory, ResourceEvent};
use crate::slot::PlaybackSlot;
use crate::types::{SlotCommand, SlotStatus};
use std::collections::{HashMap, HashSet};
use stride_core::{Reel, ReelId};
use tracing::{debug, warn};

/// Schedules playback across all slots
pub struct PlaybackController {
    /// One slot per reel in {active} ∪ preload window
    slots: HashMap<ReelId, PlaybackSlot>,

    /// Platform decoder factory
    factory: Box<dyn MediaResourceFactory>,

    /// Reel the controller was last told is active
    active: Option<ReelId>,

    /// Global mute switch
    muted: bool,

    /// Whether the feed screen has focus
    screen_focused: bool,

    /// Events not yet drained
    pending_events: Vec<FeedEvent>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("slots", &self.slots)
            .field("active", &self.active)
            .field("muted", &self.muted)
            .field("screen_focused", &self.screen_focused)
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    /// Create a controller with no slots
    pub fn new(factory: Box<dyn MediaResourceFactory>, muted: bool) -> Self {
        Self {
            slots: HashMap::new(),
            factory,
            active: None,
            muted,
            screen_focused: true,
            pending_events: Vec::new(),
        }
    }

    // ===== Scheduling =====

    /// Apply an active-reel transition and the preload window that follows it
    ///
    /// Runs as one step so no status callback can observe the deactivated
    /// slot still commanded to play:
    /// 1. pause and rewind `previous` (and anything else commanded to play)
    /// 2. release slots outside {active} ∪ preload
    /// 3. arm the preload set
    /// 4. arm the active slot and play it if the screen is focused
    pub fn reconcile(
        &mut self,
        previous: Option<&ReelId>,
        active: Option<&Reel>,
        preload: &[&Reel],
    ) {
        let active_id = active.map(|r| &r.id);

        // 1. Deactivate
        let mut to_stop: HashSet<ReelId> = self
            .slots
            .values()
            .filter(|s| s.command() == SlotCommand::Play)
            .map(|s| s.reel_id().clone())
            .collect();
        to_stop.extend(previous.cloned());
        to_stop.extend(self.active.clone());

        for id in to_stop {
            if Some(&id) == active_id {
                continue;
            }
            if let Some(slot) = self.slots.get_mut(&id) {
                let before = slot.status();
                slot.pause(true);
                debug!(reel_id = %id, "Deactivated slot, position reset");
                push_status(&mut self.pending_events, slot, before);
            }
        }

        // 2. Release everything outside the keep set
        let keep: HashSet<&ReelId> = active_id
            .into_iter()
            .chain(preload.iter().map(|r| &r.id))
            .collect();
        let evicted: Vec<ReelId> = self
            .slots
            .keys()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in evicted {
            if let Some(mut slot) = self.slots.remove(&id) {
                let before = slot.status();
                slot.release();
                debug!(reel_id = %id, "Released slot outside preload window");
                push_status(&mut self.pending_events, &slot, before);
            }
        }

        // 3. Preload neighbours
        for reel in preload {
            if Some(&reel.id) == active_id {
                continue;
            }
            self.drive(reel, false);
        }

        // 4. Active
        self.active = active_id.cloned();
        if let Some(reel) = active {
            let play = self.screen_focused;
            self.drive(reel, play);
        }
    }

    /// Arm a slot and optionally start it
    ///
    /// A slot holding a decode error is left idle until `retry`.
    fn drive(&mut self, reel: &Reel, play: bool) {
        let uri_changed = self
            .slots
            .get(&reel.id)
            .is_some_and(|slot| slot.media_uri() != reel.media_uri);
        if uri_changed {
            if let Some(mut stale) = self.slots.remove(&reel.id) {
                let before = stale.status();
                stale.release();
                debug!(reel_id = %reel.id, "Media URI changed, releasing slot");
                push_status(&mut self.pending_events, &stale, before);
            }
        }

        let muted = self.muted;
        let slot = self
            .slots
            .entry(reel.id.clone())
            .or_insert_with(|| PlaybackSlot::new(reel.id.clone(), reel.media_uri.clone(), muted));

        if slot.last_error().is_some() {
            return;
        }

        let before = slot.status();
        let result = slot.arm(self.factory.as_mut()).and_then(|()| {
            if play {
                slot.play()
            } else {
                Ok(())
            }
        });

        match result {
            Ok(()) => push_status(&mut self.pending_events, slot, before),
            Err(e) => {
                let message = decode_message(e);
                warn!(reel_id = %reel.id, error = %message, "Failed to start media resource");
                slot.fail(message.clone());
                push_status(&mut self.pending_events, slot, before);
                self.pending_events.push(FeedEvent::DecodeFailed {
                    reel_id: reel.id.clone(),
                    message,
                });
            }
        }
    }

    /// Re-arm a slot after a decode error
    ///
    /// The only way a failed slot is retried; the controller never retries
    /// on its own.
    pub fn retry(&mut self, reel: &Reel) -> crate::error::Result<()> {
        let slot = self
            .slots
            .get_mut(&reel.id)
            .ok_or_else(|| FeedError::ReelNotFound(reel.id.clone()))?;
        if slot.last_error().is_none() {
            return Ok(());
        }
        slot.clear_error();

        let play = self.screen_focused && self.active.as_ref() == Some(&reel.id);
        debug!(reel_id = %reel.id, play, "Retrying media resource");
        self.drive(reel, play);
        Ok(())
    }

    // ===== Global inputs =====

    /// Apply the global mute switch to every slot
    ///
    /// Returns `true` if the switch changed.
    pub fn set_muted(&mut self, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        for slot in self.slots.values_mut() {
            slot.set_muted(muted);
        }
        self.pending_events.push(FeedEvent::MuteChanged { muted });
        true
    }

    /// Whether audio is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Screen focus changed
    ///
    /// Losing focus pauses without rewinding; regaining focus resumes only
    /// the active slot. Returns `true` if focus changed.
    pub fn set_screen_focused(&mut self, focused: bool) -> bool {
        if self.screen_focused == focused {
            return false;
        }
        self.screen_focused = focused;

        if focused {
            if let Some(id) = self.active.clone() {
                self.resume(&id);
            }
        } else {
            for slot in self.slots.values_mut() {
                if slot.command() == SlotCommand::Play || slot.status() == SlotStatus::Playing {
                    let before = slot.status();
                    slot.pause(false);
                    push_status(&mut self.pending_events, slot, before);
                }
            }
        }

        self.pending_events.push(FeedEvent::FocusChanged { focused });
        true
    }

    /// Whether the feed screen has focus
    pub fn is_screen_focused(&self) -> bool {
        self.screen_focused
    }

    fn resume(&mut self, id: &ReelId) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        if slot.last_error().is_some() {
            return;
        }

        let before = slot.status();
        let result = if slot.has_resource() {
            slot.play()
        } else {
            slot.arm(self.factory.as_mut()).and_then(|()| slot.play())
        };

        match result {
            Ok(()) => push_status(&mut self.pending_events, slot, before),
            Err(e) => {
                let message = decode_message(e);
                warn!(reel_id = %id, error = %message, "Failed to resume media resource");
                slot.fail(message.clone());
                push_status(&mut self.pending_events, slot, before);
                self.pending_events.push(FeedEvent::DecodeFailed {
                    reel_id: id.clone(),
                    message,
                });
            }
        }
    }

    // ===== Resource callbacks =====

    /// Status callback from a decode resource
    ///
    /// Advisory only. Callbacks for released slots, and callbacks that
    /// contradict the slot's current command, are dropped.
    pub fn on_resource_event(&mut self, reel_id: &ReelId, event: ResourceEvent) {
        let Some(slot) = self.slots.get_mut(reel_id) else {
            debug!(reel_id = %reel_id, ?event, "Callback for released slot, ignoring");
            return;
        };

        let before = slot.status();
        if !slot.apply_event(&event) {
            debug!(reel_id = %reel_id, ?event, command = ?slot.command(), "Stale callback, ignoring");
            return;
        }
        push_status(&mut self.pending_events, slot, before);

        if let ResourceEvent::Failed(message) = event {
            warn!(reel_id = %reel_id, error = %message, "Media failed to decode");
            self.pending_events.push(FeedEvent::DecodeFailed {
                reel_id: reel_id.clone(),
                message,
            });
        }
    }

    // ===== Queries =====

    /// Slot for `reel_id`, if it is in the window
    pub fn slot(&self, reel_id: &ReelId) -> Option<&PlaybackSlot> {
        self.slots.get(reel_id)
    }

    /// All slots, in no particular order
    pub fn slots(&self) -> impl Iterator<Item = &PlaybackSlot> {
        self.slots.values()
    }

    /// Reel the controller considers active
    pub fn active_reel_id(&self) -> Option<&ReelId> {
        self.active.as_ref()
    }

    /// Slots whose status is `Playing`
    pub fn playing_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.status() == SlotStatus::Playing)
            .count()
    }

    /// Instantiated decode resources
    pub fn live_resource_count(&self) -> usize {
        self.slots.values().filter(|s| s.has_resource()).count()
    }

    /// Release every slot (feed unmounted)
    pub fn release_all(&mut self) {
        for (_, mut slot) in self.slots.drain() {
            let before = slot.status();
            slot.release();
            push_status(&mut self.pending_events, &slot, before);
        }
        self.active = None;
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<FeedEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

fn push_status(events: &mut Vec<FeedEvent>, slot: &PlaybackSlot, before: SlotStatus) {
    if slot.status() != before {
        events.push(FeedEvent::SlotStatusChanged {
            reel_id: slot.reel_id().clone(),
            status: slot.status(),
        });
    }
}

fn decode_message(error: FeedError) -> String {
    match error {
        FeedError::Decode { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeMediaFactory;
    use stride_core::{ActivityType, UserId};

    fn reel(id: &str) -> Reel {
        Reel::new(
            ReelId::new(id),
            UserId::new("ana"),
            format!("https://cdn/{id}.mp4"),
            ActivityType::Run,
        )
    }

    fn controller() -> (PlaybackController, crate::test_utils::FakeMediaLog) {
        let factory = FakeMediaFactory::new();
        let log = factory.log();
        (PlaybackController::new(Box::new(factory), false), log)
    }

    #[test]
    fn activation_plays_once_ready() {
        let (mut ctl, log) = controller();
        let (a, b) = (reel("a"), reel("b"));

        ctl.reconcile(None, Some(&a), &[&b]);
        assert_eq!(ctl.slot(&a.id).unwrap().command(), SlotCommand::Play);
        assert_eq!(ctl.slot(&b.id).unwrap().command(), SlotCommand::Preload);
        assert_eq!(log.live(), 2);

        ctl.on_resource_event(&a.id, ResourceEvent::Ready);
        ctl.on_resource_event(&b.id, ResourceEvent::Ready);
        assert_eq!(ctl.slot(&a.id).unwrap().status(), SlotStatus::Playing);
        assert_eq!(ctl.slot(&b.id).unwrap().status(), SlotStatus::Ready);
        assert_eq!(ctl.playing_count(), 1);
    }

    #[test]
    fn changed_media_uri_replaces_the_decoder() {
        let (mut ctl, log) = controller();
        let a = reel("a");
        ctl.reconcile(None, Some(&a), &[]);
        assert_eq!(log.created(), 1);

        let mut edited = a.clone();
        edited.media_uri = "https://cdn/a-v2.mp4".into();
        ctl.reconcile(None, Some(&edited), &[]);

        assert_eq!(ctl.slot(&a.id).unwrap().media_uri(), "https://cdn/a-v2.mp4");
        assert_eq!(log.created(), 2);
        assert_eq!(log.live(), 1);
        assert!(log.is_playing(&a.id));
    }

    #[test]
    fn deactivation_resets_progress_immediately() {
        let (mut ctl, log) = controller();
        let (a, b) = (reel("a"), reel("b"));

        ctl.reconcile(None, Some(&a), &[&b]);
        ctl.on_resource_event(&a.id, ResourceEvent::Ready);
        ctl.on_resource_event(&a.id, ResourceEvent::Progress(0.6));
        assert_eq!(ctl.slot(&a.id).unwrap().progress(), 0.6);

        ctl.reconcile(Some(&a.id), Some(&b), &[&a]);
        let old = ctl.slot(&a.id).unwrap();
        assert_eq!(old.status(), SlotStatus::Paused);
        assert_eq!(old.progress(), 0.0);
        assert_eq!(log.seeks_to_start(&a.id), 1);
        assert!(!log.is_playing(&a.id));
    }

    #[test]
    fn stale_ready_for_deactivated_slot_is_ignored() {
        let (mut ctl, _log) = controller();
        let (a, b) = (reel("a"), reel("b"));

        ctl.reconcile(None, Some(&a), &[&b]);
        ctl.reconcile(Some(&a.id), Some(&b), &[&a]);
        ctl.drain_events();

        ctl.on_resource_event(&a.id, ResourceEvent::Ready);
        assert_eq!(ctl.slot(&a.id).unwrap().status(), SlotStatus::Paused);
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn window_slide_releases_before_arming() {
        let (mut ctl, log) = controller();
        let reels: Vec<Reel> = ["a", "b", "c", "d", "e", "f"].iter().map(|s| reel(s)).collect();

        ctl.reconcile(None, Some(&reels[1]), &[&reels[0], &reels[2], &reels[3]]);
        assert_eq!(log.live(), 4);

        ctl.reconcile(Some(&reels[1].id), Some(&reels[4]), &[&reels[3], &reels[5]]);
        assert_eq!(log.live(), 3);
        assert!(log.max_live() <= 4);
        assert!(ctl.slot(&reels[0].id).is_none());
    }

    #[test]
    fn mute_applies_to_every_slot() {
        let (mut ctl, log) = controller();
        let (a, b, c) = (reel("a"), reel("b"), reel("c"));
        ctl.reconcile(None, Some(&a), &[&b, &c]);

        assert!(ctl.set_muted(true));
        assert!(!ctl.set_muted(true));
        assert!(ctl.slots().all(PlaybackSlot::is_muted));
        assert!(log.is_muted(&b.id));
        assert!(ctl
            .drain_events()
            .contains(&FeedEvent::MuteChanged { muted: true }));
    }

    #[test]
    fn focus_loss_pauses_without_reset() {
        let (mut ctl, log) = controller();
        let a = reel("a");
        ctl.reconcile(None, Some(&a), &[]);
        ctl.on_resource_event(&a.id, ResourceEvent::Ready);
        ctl.on_resource_event(&a.id, ResourceEvent::Progress(0.3));

        ctl.set_screen_focused(false);
        let slot = ctl.slot(&a.id).unwrap();
        assert_eq!(slot.status(), SlotStatus::Paused);
        assert_eq!(slot.progress(), 0.3);
        assert_eq!(ctl.playing_count(), 0);

        ctl.set_screen_focused(true);
        assert_eq!(ctl.slot(&a.id).unwrap().status(), SlotStatus::Playing);
        assert_eq!(ctl.slot(&a.id).unwrap().progress(), 0.3);
        assert_eq!(log.seeks_to_start(&a.id), 0);
    }

    #[test]
    fn activation_while_unfocused_does_not_play() {
        let (mut ctl, log) = controller();
        let a = reel("a");
        ctl.set_screen_focused(false);

        ctl.reconcile(None, Some(&a), &[]);
        assert_eq!(ctl.slot(&a.id).unwrap().command(), SlotCommand::Preload);
        assert!(!log.is_playing(&a.id));

        ctl.set_screen_focused(true);
        assert_eq!(ctl.slot(&a.id).unwrap().command(), SlotCommand::Play);
    }

    #[test]
    fn decode_failure_is_isolated_and_not_retried() {
        let factory = FakeMediaFactory::new();
        let log = factory.log();
        let mut ctl = PlaybackController::new(Box::new(factory), false);
        let (a, b) = (reel("a"), reel("b"));

        ctl.reconcile(None, Some(&a), &[&b]);
        ctl.on_resource_event(&a.id, ResourceEvent::Failed("bad frame".into()));

        let slot = ctl.slot(&a.id).unwrap();
        assert_eq!(slot.status(), SlotStatus::Idle);
        assert_eq!(slot.last_error(), Some("bad frame"));
        assert!(ctl.slot(&b.id).unwrap().has_resource());

        // Same window again: no automatic re-arm
        let created = log.created();
        ctl.reconcile(Some(&a.id), Some(&a), &[&b]);
        assert_eq!(log.created(), created);

        ctl.retry(&a).unwrap();
        assert_eq!(log.created(), created + 1);
        assert_eq!(ctl.slot(&a.id).unwrap().command(), SlotCommand::Play);
    }

    #[test]
    fn factory_failure_surfaces_decode_event() {
        let factory = FakeMediaFactory::new();
        factory.log().fail_uri("https://cdn/a.mp4");
        let mut ctl = PlaybackController::new(Box::new(factory), false);
        let a = reel("a");

        ctl.reconcile(None, Some(&a), &[]);
        let events = ctl.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, FeedEvent::DecodeFailed { reel_id, .. } if reel_id == &a.id)));
        assert_eq!(ctl.live_resource_count(), 0);
    }

    #[test]
    fn clearing_active_stops_everything() {
        let (mut ctl, log) = controller();
        let (a, b) = (reel("a"), reel("b"));
        ctl.reconcile(None, Some(&a), &[&b]);

        ctl.reconcile(Some(&a.id), None, &[]);
        assert_eq!(log.live(), 0);
        assert!(ctl.active_reel_id().is_none());
    }
}
