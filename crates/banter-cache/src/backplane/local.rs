//! Process-local backplane
//!
//! The degraded mode when no pub/sub transport is configured: publish and
//! delivery happen inside one process over a tokio broadcast channel.
//! Publishing to a room nobody here subscribes to is a successful no-op.

use std::collections::HashSet;

use async_trait::async_trait;
use banter_core::RoomId;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::backplane::{Backplane, BackplaneResult, EventEnvelope};

/// Default broadcast buffer size
const DEFAULT_BUFFER: usize = 1024;

/// Single-process backplane over a tokio broadcast channel
pub struct LocalBackplane {
    instance_id: Uuid,
    subscribed: RwLock<HashSet<RoomId>>,
    events_tx: broadcast::Sender<EventEnvelope>,
}

impl LocalBackplane {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        let (events_tx, _) = broadcast::channel(buffer);
        Self {
            instance_id: Uuid::new_v4(),
            subscribed: RwLock::new(HashSet::new()),
            events_tx,
        }
    }

    /// Rooms this process currently subscribes to
    pub async fn subscribed_rooms(&self) -> Vec<RoomId> {
        self.subscribed.read().await.iter().copied().collect()
    }
}

impl Default for LocalBackplane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backplane for LocalBackplane {
    async fn publish(&self, envelope: EventEnvelope) -> BackplaneResult<()> {
        if !self.subscribed.read().await.contains(&envelope.room) {
            tracing::trace!(room = %envelope.room, "No local subscription, dropping event");
            return Ok(());
        }

        // A send error only means no receiver is currently listening
        let _ = self.events_tx.send(envelope);
        Ok(())
    }

    async fn subscribe(&self, room: RoomId) -> BackplaneResult<()> {
        self.subscribed.write().await.insert(room);
        Ok(())
    }

    async fn unsubscribe(&self, room: RoomId) -> BackplaneResult<()> {
        self.subscribed.write().await.remove(&room);
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events_tx.subscribe()
    }

    fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_core::events::MessageSentEvent;
    use banter_core::{DomainEvent, Snowflake};

    fn sent_envelope(backplane: &LocalBackplane, room: RoomId) -> EventEnvelope {
        EventEnvelope::new(
            room,
            DomainEvent::MessageSent(MessageSentEvent::new(
                Snowflake::new(1),
                room,
                Snowflake::new(2),
            )),
            backplane.instance_id(),
        )
    }

    #[tokio::test]
    async fn test_publish_to_subscribed_room() {
        let backplane = LocalBackplane::new();
        let room = RoomId::Conversation(Snowflake::new(1));

        backplane.subscribe(room).await.unwrap();
        let mut rx = backplane.events();

        backplane
            .publish(sent_envelope(&backplane, room))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.room, room);
        assert_eq!(received.origin, backplane.instance_id());
    }

    #[tokio::test]
    async fn test_publish_without_subscription_is_noop() {
        let backplane = LocalBackplane::new();
        let room = RoomId::Conversation(Snowflake::new(1));
        let mut rx = backplane.events();

        backplane
            .publish(sent_envelope(&backplane, room))
            .await
            .unwrap();

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let backplane = LocalBackplane::new();
        let room = RoomId::Channel(Snowflake::new(9));

        backplane.subscribe(room).await.unwrap();
        backplane.unsubscribe(room).await.unwrap();
        let mut rx = backplane.events();

        backplane
            .publish(sent_envelope(&backplane, room))
            .await
            .unwrap();

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_same_room_publish_order_preserved() {
        let backplane = LocalBackplane::new();
        let room = RoomId::Conversation(Snowflake::new(1));
        backplane.subscribe(room).await.unwrap();
        let mut rx = backplane.events();

        for id in 1..=5 {
            let envelope = EventEnvelope::new(
                room,
                DomainEvent::MessageSent(MessageSentEvent::new(
                    Snowflake::new(id),
                    room,
                    Snowflake::new(2),
                )),
                backplane.instance_id(),
            );
            backplane.publish(envelope).await.unwrap();
        }

        for id in 1..=5 {
            let received = rx.recv().await.unwrap();
            match received.event {
                DomainEvent::MessageSent(e) => assert_eq!(e.message_id, Snowflake::new(id)),
                other => panic!("unexpected event: {}", other.event_type()),
            }
        }
    }
}
