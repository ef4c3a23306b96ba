use tokio::sync::broadcast;

use crate::Event;

/// Broadcast bus shared by every component of a session.
///
/// `publish()` is synchronous, so the single-threaded chunk source can emit
/// without a runtime. Events published while nobody is subscribed are
/// dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all subscribers.
    ///
    /// Accepts sub-enum values directly: `bus.publish(ChunkEvent::EndOfStream)`.
    pub fn publish<E: Into<Event>>(&self, event: E) {
        let _ = self.tx.send(event.into());
    }

    /// Subscribe to all future events.
    ///
    /// Slow subscribers receive `RecvError::Lagged(n)` instead of blocking
    /// producers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkEvent, ManifestEvent};

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        bus.publish(ChunkEvent::EndOfStream);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn publish_and_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(ManifestEvent::Reconciled {
            element_index: 0,
            delta: 5,
            chunk_offset: 5,
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            Event::Manifest(ManifestEvent::Reconciled { delta: 5, .. })
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        bus.publish(ChunkEvent::EndOfStream);
        assert_eq!(
            rx1.recv().await.unwrap(),
            Event::Chunk(ChunkEvent::EndOfStream)
        );
        assert_eq!(
            rx2.recv().await.unwrap(),
            Event::Chunk(ChunkEvent::EndOfStream)
        );
    }

    #[tokio::test]
    async fn lagged_subscriber_gets_error() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for element_index in 0..10 {
            bus.publish(ManifestEvent::RefreshRequested { element_index });
        }
        let result = rx.recv().await;
        assert!(matches!(
            result,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn clone_shares_channel() {
        let bus1 = EventBus::new(16);
        let bus2 = bus1.clone();
        let mut rx = bus1.subscribe();
        bus2.publish(ChunkEvent::EndOfStream);
        assert!(rx.try_recv().is_ok());
    }
}
