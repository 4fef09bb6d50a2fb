//! Channel service
//!
//! Channel lifecycle, membership, and moderation. Actor checks read
//! through the permission cache; every membership or role write
//! invalidates the affected user's snapshot after the repository write
//! lands.

use banter_core::entities::{Channel, ChannelVisibility};
use banter_core::{DomainError, Permissions, RoomId, Snowflake};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::permission::PermissionService;

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a channel owned by the creator
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        visibility: ChannelVisibility,
        owner_id: Snowflake,
    ) -> ServiceResult<Channel> {
        let (channel, event) =
            Channel::create(self.ctx.generate_id(), name, visibility, owner_id)?;

        self.ctx.channel_repo().add(&channel).await?;
        info!(channel_id = %channel.id, name = %channel.name, "Channel created");

        self.ctx.publish_event(channel.room(), event).await;
        Ok(channel)
    }

    /// Self-service join; public channels only
    #[instrument(skip(self))]
    pub async fn join(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut channel = self.load(channel_id).await?;
        let event = channel.join(user_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(user_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Leave voluntarily; the owner cannot leave
    #[instrument(skip(self))]
    pub async fn leave(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut channel = self.load(channel_id).await?;
        let event = channel.leave(user_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(user_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Invite a member; works for both visibilities
    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        channel_id: Snowflake,
        new_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        // Any member may invite
        self.ensure_actor(channel_id, actor_id, Permissions::READ_MESSAGES)
            .await?;

        let mut channel = self.load(channel_id).await?;
        let event = channel.add_member(new_id, actor_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(new_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Kick a member; owner or moderator only
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        channel_id: Snowflake,
        target_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ensure_actor(channel_id, actor_id, Permissions::MANAGE_MEMBERS)
            .await?;

        let mut channel = self.load(channel_id).await?;
        let event = channel.remove_member(target_id, actor_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(target_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Grant moderator status to an existing member
    #[instrument(skip(self))]
    pub async fn add_moderator(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ensure_actor(channel_id, actor_id, Permissions::MANAGE_MODERATORS)
            .await?;

        let mut channel = self.load(channel_id).await?;
        let event = channel.add_moderator(user_id, actor_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(user_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Revoke moderator status
    #[instrument(skip(self))]
    pub async fn remove_moderator(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ensure_actor(channel_id, actor_id, Permissions::MANAGE_MODERATORS)
            .await?;

        let mut channel = self.load(channel_id).await?;
        let event = channel.remove_moderator(user_id, actor_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        self.invalidate_permissions(user_id).await;
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    /// Archive a channel; owner or moderator only, idempotent
    #[instrument(skip(self))]
    pub async fn archive(&self, channel_id: Snowflake, actor_id: Snowflake) -> ServiceResult<()> {
        self.ensure_actor(channel_id, actor_id, Permissions::MANAGE_ROOM)
            .await?;

        let mut channel = self.load(channel_id).await?;
        let event = channel.archive(actor_id)?;

        self.ctx.channel_repo().update(&channel).await?;
        info!(channel_id = %channel_id, "Channel archived");
        self.ctx.publish_event(channel.room(), event).await;

        Ok(())
    }

    async fn load(&self, channel_id: Snowflake) -> ServiceResult<Channel> {
        Ok(self
            .ctx
            .channel_repo()
            .get_by_id(channel_id)
            .await?
            .ok_or(DomainError::ChannelNotFound(channel_id))?)
    }

    /// Actor gate served from the permission cache; the aggregate still
    /// enforces its own invariants on the mutation itself
    async fn ensure_actor(
        &self,
        channel_id: Snowflake,
        actor_id: Snowflake,
        required: Permissions,
    ) -> ServiceResult<()> {
        PermissionService::new(self.ctx)
            .ensure(
                RoomId::Channel(channel_id),
                actor_id,
                required,
                DomainError::ActorNotAuthorized,
            )
            .await
    }

    async fn invalidate_permissions(&self, user_id: Snowflake) {
        if let Err(e) = self.ctx.permission_cache().invalidate(user_id).await {
            warn!(user_id = %user_id, error = %e, "Permission invalidation failed; snapshot expires by TTL");
        }
    }
}
