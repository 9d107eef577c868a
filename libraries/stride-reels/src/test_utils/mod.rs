//! Test utilities for feed playback
//!
//! A recording fake decoder. `FakeMediaFactory` hands out resources that log
//! every command into a shared `FakeMediaLog`, so tests can assert on live
//! decoder counts, play state and rewinds without a platform player.

use crate::error::{FeedError, Result};
use crate::resource::{MediaResource, MediaResourceFactory};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use stride_core::ReelId;

#[derive(Debug, Default)]
struct LogState {
    created: usize,
    live: usize,
    max_live: usize,
    playing: HashSet<ReelId>,
    muted: HashMap<ReelId, bool>,
    seeks_to_start: HashMap<ReelId, usize>,
    fail_uris: HashSet<String>,
}

/// Shared record of everything the fake resources were asked to do
#[derive(Debug, Clone, Default)]
pub struct FakeMediaLog {
    state: Arc<Mutex<LogState>>,
}

impl FakeMediaLog {
    fn lock(&self) -> MutexGuard<'_, LogState> {
        // A panicking test poisons the lock; the data is still usable
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Resources created so far
    pub fn created(&self) -> usize {
        self.lock().created
    }

    /// Resources currently alive (created and not released)
    pub fn live(&self) -> usize {
        self.lock().live
    }

    /// Highest `live` count ever observed
    pub fn max_live(&self) -> usize {
        self.lock().max_live
    }

    /// Whether the resource for `id` is playing
    pub fn is_playing(&self, id: &ReelId) -> bool {
        self.lock().playing.contains(id)
    }

    /// Number of resources currently playing
    pub fn playing_count(&self) -> usize {
        self.lock().playing.len()
    }

    /// Last mute state applied to `id`
    pub fn is_muted(&self, id: &ReelId) -> bool {
        self.lock().muted.get(id).copied().unwrap_or(false)
    }

    /// How many times `id` was rewound
    pub fn seeks_to_start(&self, id: &ReelId) -> usize {
        self.lock().seeks_to_start.get(id).copied().unwrap_or(0)
    }

    /// Make `prepare` fail for `uri`
    pub fn fail_uri(&self, uri: impl Into<String>) {
        self.lock().fail_uris.insert(uri.into());
    }

    /// Let `uri` load again
    pub fn heal_uri(&self, uri: &str) {
        self.lock().fail_uris.remove(uri);
    }
}

/// Factory for recording fake resources
#[derive(Debug, Clone, Default)]
pub struct FakeMediaFactory {
    log: FakeMediaLog,
}

impl FakeMediaFactory {
    /// New factory with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared log
    pub fn log(&self) -> FakeMediaLog {
        self.log.clone()
    }
}

impl MediaResourceFactory for FakeMediaFactory {
    fn create(&mut self, reel_id: &ReelId, media_uri: &str) -> Result<Box<dyn MediaResource>> {
        let mut state = self.log.lock();
        state.created += 1;
        state.live += 1;
        state.max_live = state.max_live.max(state.live);

        Ok(Box::new(FakeMediaResource {
            reel_id: reel_id.clone(),
            media_uri: media_uri.to_string(),
            log: self.log.clone(),
            released: false,
        }))
    }
}

/// A resource that only records commands
#[derive(Debug)]
pub struct FakeMediaResource {
    reel_id: ReelId,
    media_uri: String,
    log: FakeMediaLog,
    released: bool,
}

impl FakeMediaResource {
    fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut state = self.log.lock();
        state.live = state.live.saturating_sub(1);
        state.playing.remove(&self.reel_id);
    }
}

impl MediaResource for FakeMediaResource {
    fn prepare(&mut self) -> Result<()> {
        if self.log.lock().fail_uris.contains(&self.media_uri) {
            return Err(FeedError::decode(&self.reel_id, "unsupported media"));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.log.lock().playing.insert(self.reel_id.clone());
        Ok(())
    }

    fn pause(&mut self) {
        self.log.lock().playing.remove(&self.reel_id);
    }

    fn seek_to_start(&mut self) {
        *self
            .log
            .lock()
            .seeks_to_start
            .entry(self.reel_id.clone())
            .or_insert(0) += 1;
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.lock().muted.insert(self.reel_id.clone(), muted);
    }

    fn release(&mut self) {
        self.teardown();
    }
}

impl Drop for FakeMediaResource {
    fn drop(&mut self) {
        self.teardown();
    }
}
