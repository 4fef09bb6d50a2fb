//! A single registered connection
//!
//! Holds the identity of one client connection and the channel used to
//! push frames to it. The transport drains the receiving half; a dropped
//! receiver shows up here as a closed sender.

use std::collections::HashSet;
use std::sync::Arc;

use banter_core::{RoomId, Snowflake};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// One live client connection
pub struct RegisteredConnection {
    pub connection_id: Uuid,
    pub user_id: Snowflake,

    /// Outbound frame channel; unbounded so sends preserve call order
    sender: mpsc::UnboundedSender<ServerEvent>,

    /// Rooms this connection receives events for
    subscriptions: RwLock<HashSet<RoomId>>,
}

impl RegisteredConnection {
    pub fn new(
        connection_id: Uuid,
        user_id: Snowflake,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            connection_id,
            user_id,
            sender,
            subscriptions: RwLock::new(HashSet::new()),
        })
    }

    /// Push a frame to this connection
    pub fn send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event)
    }

    /// Whether the transport side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn subscribe(&self, room: RoomId) -> bool {
        self.subscriptions.write().await.insert(room)
    }

    pub async fn unsubscribe(&self, room: RoomId) -> bool {
        self.subscriptions.write().await.remove(&room)
    }

    pub async fn is_subscribed(&self, room: RoomId) -> bool {
        self.subscriptions.read().await.contains(&room)
    }

    pub async fn subscriptions(&self) -> Vec<RoomId> {
        self.subscriptions.read().await.iter().copied().collect()
    }
}

impl std::fmt::Debug for RegisteredConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredConnection")
            .field("connection_id", &self.connection_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}
