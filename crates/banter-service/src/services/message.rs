//! Message service
//!
//! Orchestrates message mutations: validate membership, apply the
//! aggregate mutation, persist, then fan the event out. A publish failure
//! after a successful write is logged, never rolled back.

use banter_core::entities::{Message, MessageKind, ReadReceipt};
use banter_core::events::MessageSentEvent;
use banter_core::{DomainError, DomainEvent, Permissions, RoomId, Snowflake};
use chrono::Utc;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message to a room the sender belongs to
    #[instrument(skip(self, content))]
    pub async fn send(
        &self,
        room: RoomId,
        sender_id: Snowflake,
        kind: MessageKind,
        content: String,
    ) -> ServiceResult<Message> {
        self.ensure_member(room, sender_id).await?;

        let message = Message::new(self.ctx.generate_id(), room, sender_id, kind, content)?;
        self.ctx.message_repo().add(&message).await?;

        // Conversations track their last activity
        if let RoomId::Conversation(conversation_id) = room {
            if let Some(mut conversation) = self
                .ctx
                .conversation_repo()
                .get_by_id(conversation_id)
                .await?
            {
                conversation.touch(Utc::now());
                self.ctx.conversation_repo().update(&conversation).await?;
            }
        }

        info!(message_id = %message.id, room = %room, "Message sent");

        let event =
            DomainEvent::MessageSent(MessageSentEvent::new(message.id, room, sender_id));
        self.ctx.publish_event(room, event).await;

        Ok(message)
    }

    /// Edit a message's content; only the sender may edit
    #[instrument(skip(self, content))]
    pub async fn edit(
        &self,
        message_id: Snowflake,
        editor_id: Snowflake,
        content: String,
    ) -> ServiceResult<Message> {
        let mut message = self.load(message_id).await?;
        let event = message.edit(editor_id, content)?;

        self.ctx.message_repo().update(&message).await?;
        self.ctx.publish_event(message.room, event).await;

        Ok(message)
    }

    /// Soft-delete a message; only the sender may delete
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        message_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<()> {
        let mut message = self.load(message_id).await?;
        let event = message.delete(requester_id)?;

        self.ctx.message_repo().update(&message).await?;
        info!(message_id = %message_id, "Message deleted");
        self.ctx.publish_event(message.room, event).await;

        Ok(())
    }

    /// Add a reaction; duplicate (user, emoji) keys are no-op successes
    #[instrument(skip(self))]
    pub async fn add_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: String,
    ) -> ServiceResult<()> {
        let mut message = self.load(message_id).await?;

        // None means the reaction already existed; nothing to persist
        if let Some(event) = message.add_reaction(user_id, emoji)? {
            self.ctx.message_repo().update(&message).await?;
            self.ctx.publish_event(message.room, event).await;
        }
        Ok(())
    }

    /// Remove a reaction by its (user, emoji) key
    #[instrument(skip(self))]
    pub async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<()> {
        let mut message = self.load(message_id).await?;
        let event = message.remove_reaction(user_id, emoji)?;

        self.ctx.message_repo().update(&message).await?;
        self.ctx.publish_event(message.room, event).await;

        Ok(())
    }

    /// Record a read receipt; first write wins, repeats are no-op successes
    #[instrument(skip(self))]
    pub async fn mark_read(&self, message_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut message = self.load(message_id).await?;

        if let Some(event) = message.mark_read(user_id)? {
            self.ctx.message_repo().update(&message).await?;
            self.ctx.publish_event(message.room, event).await;
        }
        Ok(())
    }

    /// Read receipts for a message, in read order
    #[instrument(skip(self))]
    pub async fn read_receipts(&self, message_id: Snowflake) -> ServiceResult<Vec<ReadReceipt>> {
        let message = self.load(message_id).await?;
        Ok(message.read_receipts)
    }

    async fn load(&self, message_id: Snowflake) -> ServiceResult<Message> {
        Ok(self
            .ctx
            .message_repo()
            .get_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?)
    }

    /// Membership gate, served from the permission cache when fresh
    async fn ensure_member(&self, room: RoomId, user_id: Snowflake) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .ensure(
                room,
                user_id,
                Permissions::SEND_MESSAGES,
                DomainError::SenderNotParticipant,
            )
            .await
    }
}
