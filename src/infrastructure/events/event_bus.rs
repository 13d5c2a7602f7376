//! Event publisher implementations
//!
//! Three adapters behind the same port: a broadcast bus for in-process
//! subscribers, a tracing publisher that only logs, and a collecting
//! publisher tests assert against.

use crate::domains::releases::{
    errors::ReleaseDomainError, events::ReleaseEvent, repository::EventPublisher,
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::info;

/// Fan-out bus over a tokio broadcast channel
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ReleaseEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReleaseEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), ReleaseDomainError> {
        for event in events {
            // A send error only means nobody is listening right now.
            let _ = self.sender.send(event.clone());
        }
        Ok(())
    }
}

/// Publisher that records events into the log stream
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), ReleaseDomainError> {
        for event in events {
            info!(
                run_id = event.run_id.as_str(),
                event = event.kind.name(),
                actor = event.actor.as_str(),
                "domain event"
            );
        }
        Ok(())
    }
}

/// Publisher that keeps everything it sees, for assertions in tests
#[derive(Default)]
pub struct CollectingEventPublisher {
    events: Arc<RwLock<Vec<ReleaseEvent>>>,
}

impl CollectingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<ReleaseEvent> {
        self.events.read().expect("event log lock").clone()
    }
}

#[async_trait]
impl EventPublisher for CollectingEventPublisher {
    async fn publish(&self, events: &[ReleaseEvent]) -> Result<(), ReleaseDomainError> {
        self.events
            .write()
            .expect("event log lock")
            .extend_from_slice(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::releases::events::ReleaseEventKind;
    use crate::domains::releases::value_objects::RunId;

    fn event() -> ReleaseEvent {
        ReleaseEvent::new(
            RunId::new("rel-bus-test").unwrap(),
            ReleaseEventKind::ReleaseDrafted,
            "tester",
        )
    }

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let bus = BroadcastEventBus::default();
        let mut receiver = bus.subscribe();

        bus.publish(&[event()]).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.kind.name(), "ReleaseDrafted");
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_still_succeeds() {
        let bus = BroadcastEventBus::default();
        assert!(bus.publish(&[event()]).await.is_ok());
    }

    #[tokio::test]
    async fn collector_preserves_order() {
        let collector = CollectingEventPublisher::new();
        collector.publish(&[event(), event()]).await.unwrap();
        assert_eq!(collector.published().len(), 2);
    }
}
