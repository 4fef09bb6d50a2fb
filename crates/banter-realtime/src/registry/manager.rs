//! Connection registry
//!
//! Tracks every live connection on this process, with secondary indexes
//! by user and by subscribed room. Register and unregister report the
//! local online/offline transition exactly once; the transition is
//! detected inside the user-map entry mutation so concurrent connections
//! of the same user cannot both observe it.

use std::collections::HashSet;
use std::sync::Arc;

use banter_core::{RoomId, Snowflake};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::connection::RegisteredConnection;
use crate::protocol::ServerEvent;

/// Registry of this process's live connections
pub struct ConnectionRegistry {
    /// All connections by id
    connections: DashMap<Uuid, Arc<RegisteredConnection>>,

    /// User id to connection ids
    user_connections: DashMap<Snowflake, HashSet<Uuid>>,

    /// Room to subscribed connection ids
    room_connections: DashMap<RoomId, HashSet<Uuid>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            room_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection and return it.
    ///
    /// `came_online` in the result is true when the user had no other
    /// local connection.
    pub fn register(
        &self,
        connection_id: Uuid,
        user_id: Snowflake,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> (Arc<RegisteredConnection>, bool) {
        let connection = RegisteredConnection::new(connection_id, user_id, sender);
        self.connections.insert(connection_id, connection.clone());

        let mut entry = self.user_connections.entry(user_id).or_default();
        let came_online = entry.is_empty();
        entry.insert(connection_id);
        drop(entry);

        tracing::debug!(connection_id = %connection_id, user_id = %user_id, came_online, "Connection registered");

        (connection, came_online)
    }

    /// Remove a connection; returns true when the user went locally
    /// offline. Unknown ids return false, so repeated unregisters and
    /// abrupt disconnects taking the same path stay idempotent.
    pub async fn unregister(&self, connection_id: Uuid) -> bool {
        let Some((_, connection)) = self.connections.remove(&connection_id) else {
            return false;
        };

        let mut went_offline = false;
        if let Entry::Occupied(mut entry) = self.user_connections.entry(connection.user_id) {
            entry.get_mut().remove(&connection_id);
            if entry.get().is_empty() {
                entry.remove();
                went_offline = true;
            }
        }

        for room in connection.subscriptions().await {
            self.remove_room_index(room, connection_id);
        }

        tracing::debug!(connection_id = %connection_id, user_id = %connection.user_id, went_offline, "Connection unregistered");

        went_offline
    }

    pub fn connection(&self, connection_id: Uuid) -> Option<Arc<RegisteredConnection>> {
        self.connections.get(&connection_id).map(|r| r.clone())
    }

    /// Whether the user has at least one connection on this process
    pub fn is_online_local(&self, user_id: Snowflake) -> bool {
        self.user_connections.contains_key(&user_id)
    }

    /// All connections of a user on this process
    pub fn connections_of(&self, user_id: Snowflake) -> Vec<Arc<RegisteredConnection>> {
        self.user_connections
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Subscribe a connection to a room
    pub async fn subscribe_room(&self, connection_id: Uuid, room: RoomId) -> bool {
        let Some(connection) = self.connection(connection_id) else {
            return false;
        };
        connection.subscribe(room).await;
        self.room_connections
            .entry(room)
            .or_default()
            .insert(connection_id);
        true
    }

    /// Unsubscribe a connection from a room
    pub async fn unsubscribe_room(&self, connection_id: Uuid, room: RoomId) -> bool {
        let Some(connection) = self.connection(connection_id) else {
            return false;
        };
        connection.unsubscribe(room).await;
        self.remove_room_index(room, connection_id);
        true
    }

    /// Drop a room from every local connection of the given user
    pub async fn unsubscribe_user(&self, user_id: Snowflake, room: RoomId) {
        for connection in self.connections_of(user_id) {
            self.unsubscribe_room(connection.connection_id, room).await;
        }
    }

    /// Subscribe every local connection of the given user to a room
    pub async fn subscribe_user(&self, user_id: Snowflake, room: RoomId) {
        for connection in self.connections_of(user_id) {
            self.subscribe_room(connection.connection_id, room).await;
        }
    }

    /// Whether any local connection is subscribed to the room
    pub fn room_has_subscribers(&self, room: RoomId) -> bool {
        self.room_connections.contains_key(&room)
    }

    /// Push a frame to every connection subscribed to a room.
    ///
    /// Sends are synchronous onto unbounded channels, so two calls from
    /// the same task reach every shared subscriber in call order.
    pub fn send_to_room(&self, room: RoomId, event: &ServerEvent) -> usize {
        let Some(ids) = self.room_connections.get(&room) else {
            return 0;
        };

        let mut sent = 0;
        for id in ids.iter() {
            if let Some(connection) = self.connections.get(id) {
                if connection.send(event.clone()).is_ok() {
                    sent += 1;
                }
            }
        }

        tracing::trace!(room = %room, sent, "Frame sent to room subscribers");
        sent
    }

    /// Push a frame to every connection of a user
    pub fn send_to_user(&self, user_id: Snowflake, event: &ServerEvent) -> usize {
        let mut sent = 0;
        for connection in self.connections_of(user_id) {
            if connection.send(event.clone()).is_ok() {
                sent += 1;
            }
        }
        sent
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    fn remove_room_index(&self, room: RoomId, connection_id: Uuid) {
        if let Entry::Occupied(mut entry) = self.room_connections.entry(room) {
            entry.get_mut().remove(&connection_id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("rooms", &self.room_connections.len())
            .finish()
    }
}
