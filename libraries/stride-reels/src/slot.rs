//! Playback slots
//!
//! One slot per reel, keyed by reel id rather than list index. The slot owns
//! the decode resource; the rendering layer only reads a `SlotView`.

use crate::error::{FeedError, Result};
use crate::resource::{MediaResource, MediaResourceFactory, ResourceEvent};
use crate::types::{SlotCommand, SlotStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use stride_core::ReelId;

/// Read-only snapshot a list cell renders from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    /// Reel this slot plays
    pub reel_id: ReelId,
    /// Current status
    pub status: SlotStatus,
    /// Global mute as applied to this slot
    pub muted: bool,
    /// Playback position in `[0, 1]`
    pub progress_fraction: f32,
    /// Last decode error (cell shows a retry affordance)
    pub error: Option<String>,
}

/// Per-reel playback resource and its state machine
pub struct PlaybackSlot {
    reel_id: ReelId,
    media_uri: String,
    status: SlotStatus,
    command: SlotCommand,
    muted: bool,
    progress: f32,
    resource: Option<Box<dyn MediaResource>>,
    last_error: Option<String>,
}

impl fmt::Debug for PlaybackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSlot")
            .field("reel_id", &self.reel_id)
            .field("status", &self.status)
            .field("command", &self.command)
            .field("muted", &self.muted)
            .field("progress", &self.progress)
            .field("has_resource", &self.resource.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl PlaybackSlot {
    pub(crate) fn new(reel_id: ReelId, media_uri: impl Into<String>, muted: bool) -> Self {
        Self {
            reel_id,
            media_uri: media_uri.into(),
            status: SlotStatus::Idle,
            command: SlotCommand::Release,
            muted,
            progress: 0.0,
            resource: None,
            last_error: None,
        }
    }

    /// Reel this slot plays
    pub fn reel_id(&self) -> &ReelId {
        &self.reel_id
    }

    /// Media URI
    pub fn media_uri(&self) -> &str {
        &self.media_uri
    }

    /// Current status
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    /// Last command issued by the controller
    pub fn command(&self) -> SlotCommand {
        self.command
    }

    /// Whether the global mute is applied
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Playback position in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Last decode error
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a decode resource is instantiated
    pub fn has_resource(&self) -> bool {
        self.resource.is_some()
    }

    /// Snapshot for rendering
    pub fn view(&self) -> SlotView {
        SlotView {
            reel_id: self.reel_id.clone(),
            status: self.status,
            muted: self.muted,
            progress_fraction: self.progress,
            error: self.last_error.clone(),
        }
    }

    /// Instantiate and prepare the resource if missing
    ///
    /// A slot that already has a resource keeps its command and position.
    pub(crate) fn arm(&mut self, factory: &mut dyn MediaResourceFactory) -> Result<()> {
        if self.resource.is_some() {
            return Ok(());
        }

        let mut resource = factory.create(&self.reel_id, &self.media_uri)?;
        resource.set_muted(self.muted);
        resource.prepare()?;

        self.resource = Some(resource);
        self.status = SlotStatus::Loading;
        self.command = SlotCommand::Preload;
        self.progress = 0.0;
        self.last_error = None;
        Ok(())
    }

    pub(crate) fn play(&mut self) -> Result<()> {
        let resource = self.resource.as_mut().ok_or_else(|| {
            FeedError::InvalidOperation(format!("slot {} has no resource", self.reel_id))
        })?;
        resource.play()?;

        self.command = SlotCommand::Play;
        if matches!(
            self.status,
            SlotStatus::Ready | SlotStatus::Paused | SlotStatus::Playing
        ) {
            self.status = SlotStatus::Playing;
        }
        Ok(())
    }

    /// Pause; `reset` also rewinds to the start (deactivation)
    pub(crate) fn pause(&mut self, reset: bool) {
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
            if reset {
                resource.seek_to_start();
            }
            self.status = SlotStatus::Paused;
            self.command = SlotCommand::Pause;
        }
        if reset {
            self.progress = 0.0;
        }
    }

    pub(crate) fn release(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.pause();
            resource.release();
        }
        self.status = SlotStatus::Idle;
        self.command = SlotCommand::Release;
        self.progress = 0.0;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.release();
        self.last_error = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(resource) = self.resource.as_mut() {
            resource.set_muted(muted);
        }
    }

    /// Apply a status callback
    ///
    /// Returns `false` when the callback is stale for the current command
    /// (e.g. `Ready` arriving for a slot that was already deactivated).
    pub(crate) fn apply_event(&mut self, event: &ResourceEvent) -> bool {
        use SlotCommand::{Pause, Play, Preload, Release};

        match (self.command, event) {
            (Release, _) => false,
            (_, ResourceEvent::Failed(message)) => {
                self.fail(message.clone());
                true
            }
            (Play | Preload, ResourceEvent::Loading) => {
                self.status = SlotStatus::Loading;
                true
            }
            (Play | Preload, ResourceEvent::Buffering) => {
                self.status = SlotStatus::Buffering;
                true
            }
            (Play, ResourceEvent::Ready) => {
                self.status = SlotStatus::Playing;
                true
            }
            (Preload, ResourceEvent::Ready) => {
                self.status = SlotStatus::Ready;
                true
            }
            (Play, ResourceEvent::Progress(fraction)) => {
                self.progress = fraction.clamp(0.0, 1.0);
                true
            }
            (Pause, _) | (Preload, ResourceEvent::Progress(_)) => false,
        }
    }
}
