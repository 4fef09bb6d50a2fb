//! Wire envelope for backplane events

use banter_core::{DomainEvent, RoomId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A domain event in flight between processes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Routing key; doubles as the pub/sub channel name in string form
    pub room: RoomId,
    /// The event being fanned out
    pub event: DomainEvent,
    /// Publishing instance, for diagnostics and self-delivery detection
    pub origin: Uuid,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(room: RoomId, event: DomainEvent, origin: Uuid) -> Self {
        Self { room, event, origin }
    }

    /// Serialize for the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from the wire
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
