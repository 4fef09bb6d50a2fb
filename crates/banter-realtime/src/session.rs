//! Realtime session
//!
//! One session per client connection. Connect registers the connection,
//! re-validates the user's rooms against the repositories before
//! subscribing, and drives presence; disconnect is idempotent and covers
//! abrupt transport drops. Commands dispatch onto the application
//! services in a single exhaustive match, and failures go back down the
//! same connection as Error frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use banter_core::{RoomId, Snowflake};
use banter_service::services::{
    ChannelService, ConversationService, MessageService, PresenceService, ServiceContext,
    ServiceResult,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ClientCommand, ServerEvent};
use crate::registry::{ConnectionRegistry, RegisteredConnection};

/// The server half of one client connection
pub struct RealtimeSession {
    ctx: ServiceContext,
    registry: Arc<ConnectionRegistry>,
    connection: Arc<RegisteredConnection>,
    disconnected: AtomicBool,
}

impl RealtimeSession {
    /// Establish a session: register, subscribe the user's rooms, and
    /// bring presence up. Sends `Ready` as the first frame.
    pub async fn connect(
        ctx: ServiceContext,
        registry: Arc<ConnectionRegistry>,
        user_id: Snowflake,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> ServiceResult<Self> {
        let connection_id = Uuid::new_v4();
        let (connection, _) = registry.register(connection_id, user_id, sender);

        let session = Self {
            ctx,
            registry,
            connection,
            disconnected: AtomicBool::new(false),
        };

        // Ready is always the first frame on the wire
        session.send_self(ServerEvent::Ready { connection_id });

        // Membership is re-validated here; a stale client cannot carry
        // subscriptions into rooms it no longer belongs to.
        for room in session.user_rooms(user_id).await? {
            session
                .registry
                .subscribe_room(connection_id, room)
                .await;
            session.backplane_subscribe(room).await;
        }

        PresenceService::new(&session.ctx)
            .connection_opened(user_id)
            .await?;
        info!(connection_id = %connection_id, user_id = %user_id, "Session connected");

        Ok(session)
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection.connection_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.connection.user_id
    }

    /// Tear the session down. Safe to call more than once; abrupt
    /// transport drops take this same path.
    pub async fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }

        let rooms = self.connection.subscriptions().await;
        self.registry.unregister(self.connection_id()).await;
        for room in rooms {
            self.backplane_unsubscribe_if_unused(room).await;
        }

        if let Err(e) = PresenceService::new(&self.ctx)
            .connection_closed(self.user_id())
            .await
        {
            warn!(user_id = %self.user_id(), error = %e, "Presence teardown failed");
        }

        info!(connection_id = %self.connection_id(), user_id = %self.user_id(), "Session disconnected");
    }

    /// Dispatch one command; failures are sent back as Error frames
    pub async fn handle(&self, command: ClientCommand) {
        let op = command.op();
        if let Err(e) = self.dispatch(command).await {
            warn!(connection_id = %self.connection_id(), op, error = %e, "Command failed");
            self.send_self(ServerEvent::error(e.error_code(), e.to_string()));
        }
    }

    async fn dispatch(&self, command: ClientCommand) -> ServiceResult<()> {
        let user_id = self.user_id();

        match command {
            ClientCommand::SendMessage {
                room,
                kind,
                content,
            } => {
                MessageService::new(&self.ctx)
                    .send(room, user_id, kind, content)
                    .await?;
            }
            ClientCommand::EditMessage {
                message_id,
                content,
            } => {
                MessageService::new(&self.ctx)
                    .edit(message_id, user_id, content)
                    .await?;
            }
            ClientCommand::DeleteMessage { message_id } => {
                MessageService::new(&self.ctx)
                    .delete(message_id, user_id)
                    .await?;
            }
            ClientCommand::AddReaction { message_id, emoji } => {
                MessageService::new(&self.ctx)
                    .add_reaction(message_id, user_id, emoji)
                    .await?;
            }
            ClientCommand::RemoveReaction { message_id, emoji } => {
                MessageService::new(&self.ctx)
                    .remove_reaction(message_id, user_id, &emoji)
                    .await?;
            }
            ClientCommand::MarkRead { message_id } => {
                MessageService::new(&self.ctx)
                    .mark_read(message_id, user_id)
                    .await?;
            }
            ClientCommand::StartTyping { room } => {
                PresenceService::new(&self.ctx)
                    .start_typing(room, user_id)
                    .await?;
            }
            ClientCommand::JoinChannel { channel_id } => {
                ChannelService::new(&self.ctx).join(channel_id, user_id).await?;
                self.subscribe_user_rooms(user_id, RoomId::Channel(channel_id))
                    .await;
            }
            ClientCommand::LeaveChannel { channel_id } => {
                ChannelService::new(&self.ctx).leave(channel_id, user_id).await?;
                self.unsubscribe_user_rooms(user_id, RoomId::Channel(channel_id))
                    .await;
            }
            ClientCommand::AddParticipant { room, user_id: target } => {
                match room {
                    RoomId::Conversation(conversation_id) => {
                        ConversationService::new(&self.ctx)
                            .add_participant(conversation_id, target, user_id)
                            .await?;
                    }
                    RoomId::Channel(channel_id) => {
                        ChannelService::new(&self.ctx)
                            .add_member(channel_id, target, user_id)
                            .await?;
                    }
                }
                self.subscribe_user_rooms(target, room).await;
            }
            ClientCommand::RemoveParticipant { room, user_id: target } => {
                match room {
                    RoomId::Conversation(conversation_id) => {
                        ConversationService::new(&self.ctx)
                            .remove_participant(conversation_id, target, user_id)
                            .await?;
                    }
                    RoomId::Channel(channel_id) => {
                        ChannelService::new(&self.ctx)
                            .remove_member(channel_id, target, user_id)
                            .await?;
                    }
                }
                // Every local session of the removed user drops the room
                self.unsubscribe_user_rooms(target, room).await;
            }
            ClientCommand::AddModerator { channel_id, user_id: target } => {
                ChannelService::new(&self.ctx)
                    .add_moderator(channel_id, target, user_id)
                    .await?;
            }
            ClientCommand::RemoveModerator { channel_id, user_id: target } => {
                ChannelService::new(&self.ctx)
                    .remove_moderator(channel_id, target, user_id)
                    .await?;
            }
        }

        Ok(())
    }

    async fn user_rooms(&self, user_id: Snowflake) -> ServiceResult<Vec<RoomId>> {
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

    /// Subscribe all of the user's local sessions to a room they joined
    async fn subscribe_user_rooms(&self, user_id: Snowflake, room: RoomId) {
        if self.registry.is_online_local(user_id) {
            self.registry.subscribe_user(user_id, room).await;
            self.backplane_subscribe(room).await;
        }
    }

    /// Drop a room from all of the user's local sessions
    async fn unsubscribe_user_rooms(&self, user_id: Snowflake, room: RoomId) {
        self.registry.unsubscribe_user(user_id, room).await;
        self.backplane_unsubscribe_if_unused(room).await;
    }

    async fn backplane_subscribe(&self, room: RoomId) {
        if let Err(e) = self.ctx.backplane().subscribe(room).await {
            warn!(room = %room, error = %e, "Backplane subscribe failed");
        }
    }

    async fn backplane_unsubscribe_if_unused(&self, room: RoomId) {
        if self.registry.room_has_subscribers(room) {
            return;
        }
        if let Err(e) = self.ctx.backplane().unsubscribe(room).await {
            warn!(room = %room, error = %e, "Backplane unsubscribe failed");
        }
    }

    fn send_self(&self, event: ServerEvent) {
        // A closed transport is torn down by disconnect shortly after
        let _ = self.connection.send(event);
    }
}

impl std::fmt::Debug for RealtimeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSession")
            .field("connection_id", &self.connection_id())
            .field("user_id", &self.user_id())
            .finish()
    }
}
