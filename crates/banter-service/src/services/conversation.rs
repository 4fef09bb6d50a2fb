//! Conversation service
//!
//! Direct and group conversation lifecycle. Membership mutations
//! invalidate the affected user's permission snapshot only after the
//! repository write has landed.

use banter_core::entities::{Conversation, ConversationKind};
use banter_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a direct (1:1) conversation between the creator and one peer
    #[instrument(skip(self))]
    pub async fn create_direct(
        &self,
        creator_id: Snowflake,
        peer_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        self.create(ConversationKind::Direct, vec![peer_id], creator_id)
            .await
    }

    /// Create a group conversation; the creator is always a participant
    #[instrument(skip(self, participant_ids))]
    pub async fn create_group(
        &self,
        creator_id: Snowflake,
        participant_ids: Vec<Snowflake>,
    ) -> ServiceResult<Conversation> {
        self.create(ConversationKind::Group, participant_ids, creator_id)
            .await
    }

    async fn create(
        &self,
        kind: ConversationKind,
        participant_ids: Vec<Snowflake>,
        creator_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        let (conversation, event) =
            Conversation::create(self.ctx.generate_id(), kind, participant_ids, creator_id)?;

        self.ctx.conversation_repo().add(&conversation).await?;
        info!(conversation_id = %conversation.id, ?kind, "Conversation created");

        self.ctx.publish_event(conversation.room(), event).await;
        Ok(conversation)
    }

    /// Add a participant to a group conversation
    #[instrument(skip(self))]
    pub async fn add_participant(
        &self,
        conversation_id: Snowflake,
        new_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        let mut conversation = self.load(conversation_id).await?;
        let event = conversation.add_participant(new_id, actor_id)?;

        self.ctx.conversation_repo().update(&conversation).await?;
        self.invalidate_permissions(new_id).await;
        self.ctx.publish_event(conversation.room(), event).await;

        Ok(())
    }

    /// Remove a participant from a group conversation
    #[instrument(skip(self))]
    pub async fn remove_participant(
        &self,
        conversation_id: Snowflake,
        target_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        let mut conversation = self.load(conversation_id).await?;
        let event = conversation.remove_participant(target_id, actor_id)?;

        self.ctx.conversation_repo().update(&conversation).await?;
        self.invalidate_permissions(target_id).await;
        self.ctx.publish_event(conversation.room(), event).await;

        Ok(())
    }

    /// Archive a conversation; idempotent
    #[instrument(skip(self))]
    pub async fn archive(
        &self,
        conversation_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        let mut conversation = self.load(conversation_id).await?;
        let event = conversation.archive(actor_id)?;

        self.ctx.conversation_repo().update(&conversation).await?;
        self.ctx.publish_event(conversation.room(), event).await;

        Ok(())
    }

    /// Unarchive a conversation; idempotent
    #[instrument(skip(self))]
    pub async fn unarchive(
        &self,
        conversation_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        let mut conversation = self.load(conversation_id).await?;
        let event = conversation.unarchive(actor_id)?;

        self.ctx.conversation_repo().update(&conversation).await?;
        self.ctx.publish_event(conversation.room(), event).await;

        Ok(())
    }

    async fn load(&self, conversation_id: Snowflake) -> ServiceResult<Conversation> {
        Ok(self
            .ctx
            .conversation_repo()
            .get_by_id(conversation_id)
            .await?
            .ok_or(DomainError::ConversationNotFound(conversation_id))?)
    }

    /// Drop a stale permission snapshot once the membership write has landed
    async fn invalidate_permissions(&self, user_id: Snowflake) {
        if let Err(e) = self.ctx.permission_cache().invalidate(user_id).await {
            warn!(user_id = %user_id, error = %e, "Permission invalidation failed; snapshot expires by TTL");
        }
    }
}
