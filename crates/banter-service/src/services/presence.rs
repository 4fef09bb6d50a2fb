//! Presence and typing service
//!
//! Drives the global connection counter from connection lifecycle hooks
//! and fans out `PresenceChanged` only on the 0->1 and ->0 crossings.
//! Intermediate counts (a second tab opening, one of three tabs closing)
//! change nothing observable.

use banter_core::events::{PresenceChangedEvent, TypingStartedEvent};
use banter_core::{DomainEvent, RoomId, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a new connection for the user.
    ///
    /// Returns true when this was the user's first connection anywhere,
    /// i.e. they just came online.
    #[instrument(skip(self))]
    pub async fn connection_opened(&self, user_id: Snowflake) -> ServiceResult<bool> {
        let count = self.ctx.presence_store().connection_added(user_id).await?;
        debug!(user_id = %user_id, count, "Connection opened");

        let came_online = count == 1;
        if came_online {
            self.broadcast_presence(user_id, true).await?;
        }
        Ok(came_online)
    }

    /// Record a closed connection for the user.
    ///
    /// Returns true when this was the user's last connection anywhere,
    /// i.e. they just went offline.
    #[instrument(skip(self))]
    pub async fn connection_closed(&self, user_id: Snowflake) -> ServiceResult<bool> {
        let count = self.ctx.presence_store().connection_removed(user_id).await?;
        debug!(user_id = %user_id, count, "Connection closed");

        let went_offline = count == 0;
        if went_offline {
            self.broadcast_presence(user_id, false).await?;
        }
        Ok(went_offline)
    }

    /// Whether the user has at least one connection anywhere
    pub async fn is_online(&self, user_id: Snowflake) -> ServiceResult<bool> {
        Ok(self.ctx.presence_store().is_online(user_id).await?)
    }

    /// Start or renew a typing indicator; expiry is the only stop signal
    #[instrument(skip(self))]
    pub async fn start_typing(&self, room: RoomId, user_id: Snowflake) -> ServiceResult<()> {
        let ttl = self.ctx.config().presence.typing_ttl();
        self.ctx.typing_store().start(room, user_id, ttl).await?;

        let event = DomainEvent::TypingStarted(TypingStartedEvent::new(room, user_id));
        self.ctx.publish_event(room, event).await;
        Ok(())
    }

    /// Users currently typing in a room
    pub async fn typing_users(&self, room: RoomId) -> ServiceResult<Vec<Snowflake>> {
        Ok(self.ctx.typing_store().typing_users(room).await?)
    }

    /// Publish a presence transition to every room the user belongs to
    async fn broadcast_presence(&self, user_id: Snowflake, online: bool) -> ServiceResult<()> {
        for room in self.rooms_for_user(user_id).await? {
            let event =
                DomainEvent::PresenceChanged(PresenceChangedEvent::new(user_id, online));
            self.ctx.publish_event(room, event).await;
        }
        Ok(())
    }

    async fn rooms_for_user(&self, user_id: Snowflake) -> ServiceResult<Vec<RoomId>> {
        let mut rooms = Vec::new();
        for conversation in self
            .ctx
            .conversation_repo()
            .list_for_user(user_id)
            .await?
        {
            rooms.push(conversation.room());
        }
        for channel in self.ctx.channel_repo().list_for_user(user_id).await? {
            rooms.push(channel.room());
        }
        Ok(rooms)
    }
}
