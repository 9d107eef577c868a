//! End-to-end feed scenarios
//!
//! Drives `ReelFeed` the way a list widget would (scroll samples, settle,
//! resource callbacks) and checks playback through the recording fake.

use std::time::{Duration, Instant};
use stride_core::{ActivityType, CurrentUser, Reel, ReelId, UserId};
use stride_reels::test_utils::{FakeMediaFactory, FakeMediaLog};
use stride_reels::{FeedConfig, FeedEvent, ReelFeed, ResourceEvent, SlotStatus};

const ITEM_HEIGHT: f32 = 844.0;

fn reel(id: &str, author: &str) -> Reel {
    Reel::new(
        ReelId::new(id),
        UserId::new(author),
        format!("https://cdn.example.com/{id}.mp4"),
        ActivityType::Run,
    )
}

fn id(s: &str) -> ReelId {
    ReelId::new(s)
}

fn five_reel_feed() -> (ReelFeed, FakeMediaLog) {
    let factory = FakeMediaFactory::new();
    let log = factory.log();
    let viewer = CurrentUser::with_following(
        UserId::new("me"),
        ["ana", "bo", "cy", "dee"].into_iter().map(UserId::new),
    );
    let mut feed = ReelFeed::new(&FeedConfig::default(), viewer, Box::new(factory));
    feed.replace_reels(vec![
        reel("A", "ana"),
        reel("B", "bo"),
        reel("C", "cy"),
        reel("D", "dee"),
        reel("E", "ana"),
    ]);
    (feed, log)
}

/// Fling to `index` and let it settle past the dwell window
fn scroll_to(feed: &mut ReelFeed, index: usize, at: Instant) -> Instant {
    feed.begin_gesture();
    // Mid-fling frame: two partially visible cells
    feed.on_scroll((index as f32 - 0.5) * ITEM_HEIGHT, ITEM_HEIGHT, at);
    feed.on_scroll(index as f32 * ITEM_HEIGHT, ITEM_HEIGHT, at + Duration::from_millis(16));
    let settled = at + Duration::from_millis(80);
    feed.settle(settled);
    settled
}

fn window(feed: &ReelFeed) -> Vec<&str> {
    let mut ids: Vec<&str> = feed
        .preload_window()
        .reel_ids()
        .iter()
        .map(ReelId::as_str)
        .collect();
    ids.sort_unstable();
    ids
}

#[test]
fn mute_author_of_preloaded_reel_keeps_active() {
    let (mut feed, log) = five_reel_feed();
    scroll_to(&mut feed, 2, Instant::now());

    assert_eq!(feed.active_reel_id(), Some(&id("C")));
    assert_eq!(window(&feed), vec!["B", "D", "E"]);
    assert_eq!(log.live(), 4);

    feed.mute_author(&UserId::new("dee"));

    let visible: Vec<&str> = feed.visible_ids().iter().map(ReelId::as_str).collect();
    assert_eq!(visible, vec!["A", "B", "C", "E"]);
    assert_eq!(feed.active_reel_id(), Some(&id("C")));
    assert_eq!(feed.active_index(), Some(2));
    assert_eq!(window(&feed), vec!["B", "E"]);

    assert!(feed.slot_view(&id("D")).is_none());
    assert_eq!(log.live(), 3);
    assert!(log.is_playing(&id("C")));
    assert!(log.max_live() <= 4);
}

#[test]
fn muting_active_author_moves_playback_synchronously() {
    let (mut feed, log) = five_reel_feed();
    scroll_to(&mut feed, 2, Instant::now());
    feed.drain_events();

    feed.mute_author(&UserId::new("cy"));

    assert_eq!(feed.active_reel_id(), Some(&id("D")));
    assert!(!log.is_playing(&id("C")));
    assert!(log.is_playing(&id("D")));
    assert_eq!(log.playing_count(), 1);

    let events = feed.drain_events();
    let active_pos = events
        .iter()
        .position(|e| matches!(e, FeedEvent::ActiveChanged { .. }))
        .unwrap();
    let window_pos = events
        .iter()
        .position(|e| matches!(e, FeedEvent::PreloadWindowChanged { .. }))
        .unwrap();
    assert!(active_pos < window_pos);
}

#[test]
fn background_and_foreground_keep_position() {
    let (mut feed, log) = five_reel_feed();
    scroll_to(&mut feed, 0, Instant::now());
    let x = id("A");

    feed.on_resource_event(&x, ResourceEvent::Ready);
    feed.on_resource_event(&x, ResourceEvent::Progress(0.42));
    assert_eq!(feed.slot_view(&x).unwrap().status, SlotStatus::Playing);

    feed.set_screen_focused(false);
    let view = feed.slot_view(&x).unwrap();
    assert_eq!(view.status, SlotStatus::Paused);
    assert_eq!(view.progress_fraction, 0.42);
    assert!(!view.muted);
    assert_eq!(log.playing_count(), 0);

    feed.set_screen_focused(true);
    let view = feed.slot_view(&x).unwrap();
    assert_eq!(view.status, SlotStatus::Playing);
    assert_eq!(view.progress_fraction, 0.42);
    assert_eq!(log.seeks_to_start(&x), 0);
    assert!(feed.viewport_state().screen_focused);
}

#[test]
fn scroll_while_unfocused_does_not_start_playback() {
    let (mut feed, log) = five_reel_feed();
    feed.set_screen_focused(false);

    scroll_to(&mut feed, 1, Instant::now());
    assert_eq!(feed.active_reel_id(), Some(&id("B")));
    assert_eq!(log.playing_count(), 0);

    feed.set_screen_focused(true);
    assert!(log.is_playing(&id("B")));
}

#[test]
fn double_tap_like_converges_to_liked() {
    let (mut feed, _log) = five_reel_feed();
    let r = id("B");

    assert_eq!(feed.begin_toggle_like(&r).unwrap(), Some(true));
    assert_eq!(feed.begin_toggle_like(&r).unwrap(), None);

    let server = feed.store().get(&r).cloned().unwrap();
    feed.finish_like(&r, Ok(server));

    assert!(feed.store().get(&r).unwrap().is_liked_by(&UserId::new("me")));
    assert_eq!(feed.store().get(&r).unwrap().like_count(), 1);
}

#[test]
fn stale_ready_after_fast_scroll_is_dropped() {
    let (mut feed, log) = five_reel_feed();
    let t = scroll_to(&mut feed, 0, Instant::now());
    let t = scroll_to(&mut feed, 1, t);
    scroll_to(&mut feed, 2, t);

    // A's decoder reports ready long after A was deactivated and released
    feed.on_resource_event(&id("A"), ResourceEvent::Ready);
    // B is still in the window (active-1) but paused
    feed.on_resource_event(&id("B"), ResourceEvent::Ready);

    assert_eq!(feed.slot_view(&id("B")).unwrap().status, SlotStatus::Paused);
    assert_eq!(feed.controller().playing_count(), 0);
    feed.on_resource_event(&id("C"), ResourceEvent::Ready);
    assert_eq!(feed.controller().playing_count(), 1);
    assert_eq!(log.playing_count(), 1);
}

#[test]
fn deactivation_rewinds_previous_immediately() {
    let (mut feed, log) = five_reel_feed();
    let t = scroll_to(&mut feed, 0, Instant::now());
    feed.on_resource_event(&id("A"), ResourceEvent::Ready);
    feed.on_resource_event(&id("A"), ResourceEvent::Progress(0.8));

    scroll_to(&mut feed, 1, t);

    let view = feed.slot_view(&id("A")).unwrap();
    assert_eq!(view.progress_fraction, 0.0);
    assert_eq!(view.status, SlotStatus::Paused);
    assert_eq!(log.seeks_to_start(&id("A")), 1);
    assert!(!log.is_playing(&id("A")));
}

#[test]
fn decode_failure_is_isolated() {
    let factory = FakeMediaFactory::new();
    let log = factory.log();
    log.fail_uri("https://cdn.example.com/B.mp4");
    let viewer = CurrentUser::with_following(UserId::new("me"), [UserId::new("ana")]);
    let mut feed = ReelFeed::new(&FeedConfig::default(), viewer, Box::new(factory));
    feed.replace_reels(vec![reel("A", "ana"), reel("B", "ana"), reel("C", "ana")]);

    scroll_to(&mut feed, 0, Instant::now());
    let events = feed.drain_events();
    assert!(events.iter().any(
        |e| matches!(e, FeedEvent::DecodeFailed { reel_id, .. } if reel_id.as_str() == "B")
    ));
    assert!(log.is_playing(&id("A")));
    assert!(feed.slot_view(&id("C")).is_some());
    assert_eq!(feed.slot_view(&id("B")).unwrap().status, SlotStatus::Idle);

    log.heal_uri("https://cdn.example.com/B.mp4");
    feed.retry(&id("B")).unwrap();
    assert_eq!(feed.slot_view(&id("B")).unwrap().status, SlotStatus::Loading);
    assert!(!log.is_playing(&id("B")));
}
