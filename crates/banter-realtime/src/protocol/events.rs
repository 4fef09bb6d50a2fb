//! Server events
//!
//! Everything the server pushes down a connection. `Event` carries a
//! process-local monotone sequence so clients can spot gaps after a
//! dispatcher lag.

use banter_core::events::DomainEvent;
use banter_core::RoomId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frames pushed to a connected client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerEvent {
    /// Sent once, immediately after a successful connect
    Ready { connection_id: Uuid },

    /// A domain event fanned out to a subscribed room
    Event {
        room: RoomId,
        seq: u64,
        event: DomainEvent,
    },

    /// A command failed; the code matches the domain error codes
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}
