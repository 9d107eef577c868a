/// Simulated decode resources
///
/// Each resource logs the commands it receives and queues the status
/// callbacks a real player would deliver, so the driver loop can feed them
/// back into the feed.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use stride_core::ReelId;
use stride_reels::{MediaResource, MediaResourceFactory, ResourceEvent};
use tracing::debug;

type Queue = Arc<Mutex<VecDeque<(ReelId, ResourceEvent)>>>;

/// Pending resource callbacks shared between the factory and the driver
#[derive(Debug, Clone, Default)]
pub struct ResourceEvents {
    queue: Queue,
}

impl ResourceEvents {
    fn lock(&self) -> MutexGuard<'_, VecDeque<(ReelId, ResourceEvent)>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, reel_id: &ReelId, event: ResourceEvent) {
        self.lock().push_back((reel_id.clone(), event));
    }

    /// Take every queued callback in delivery order
    pub fn drain(&self) -> Vec<(ReelId, ResourceEvent)> {
        self.lock().drain(..).collect()
    }
}

#[derive(Debug, Default)]
pub struct SimMediaFactory {
    events: ResourceEvents,
}

impl SimMediaFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> ResourceEvents {
        self.events.clone()
    }
}

impl MediaResourceFactory for SimMediaFactory {
    fn create(
        &mut self,
        reel_id: &ReelId,
        media_uri: &str,
    ) -> stride_reels::Result<Box<dyn MediaResource>> {
        debug!(reel_id = %reel_id, uri = media_uri, "Creating decoder");
        Ok(Box::new(SimMediaResource {
            reel_id: reel_id.clone(),
            events: self.events.clone(),
            position: 0.0,
        }))
    }
}

struct SimMediaResource {
    reel_id: ReelId,
    events: ResourceEvents,
    position: f32,
}

impl MediaResource for SimMediaResource {
    fn prepare(&mut self) -> stride_reels::Result<()> {
        self.events.push(&self.reel_id, ResourceEvent::Loading);
        self.events.push(&self.reel_id, ResourceEvent::Ready);
        Ok(())
    }

    fn play(&mut self) -> stride_reels::Result<()> {
        debug!(reel_id = %self.reel_id, "play");
        self.position = (self.position + 0.25).min(1.0);
        self.events
            .push(&self.reel_id, ResourceEvent::Progress(self.position));
        Ok(())
    }

    fn pause(&mut self) {
        debug!(reel_id = %self.reel_id, "pause");
    }

    fn seek_to_start(&mut self) {
        self.position = 0.0;
    }

    fn set_muted(&mut self, muted: bool) {
        debug!(reel_id = %self.reel_id, muted, "set_muted");
    }

    fn release(&mut self) {
        debug!(reel_id = %self.reel_id, "Released decoder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_queues_loading_then_ready() {
        let mut factory = SimMediaFactory::new();
        let events = factory.events();

        let mut resource = factory.create(&ReelId::new("r1"), "uri").unwrap();
        resource.prepare().unwrap();

        let drained = events.drain();
        assert_eq!(
            drained,
            vec![
                (ReelId::new("r1"), ResourceEvent::Loading),
                (ReelId::new("r1"), ResourceEvent::Ready),
            ]
        );
        assert!(events.drain().is_empty());
    }
}
