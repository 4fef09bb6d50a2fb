//! Permission service
//!
//! Computes a user's permissions for a room, backed by the time-bounded
//! permission cache. The cached snapshot is keyed by user and holds one
//! entry per room, so rights computed for one room never leak into
//! another. Entries are computed from the room aggregate on a miss and
//! cached with the configured TTL; membership mutations elsewhere
//! invalidate the affected user after their write lands.

use banter_core::{DomainError, PermissionSnapshot, Permissions, RoomId, Snowflake};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Permission service
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get the user's permissions for a room, from cache when fresh
    #[instrument(skip(self))]
    pub async fn permissions_for(
        &self,
        room: RoomId,
        user_id: Snowflake,
    ) -> ServiceResult<Permissions> {
        let cached = self.ctx.permission_cache().get(user_id).await?;
        if let Some(snapshot) = &cached {
            if let Some(permissions) = snapshot.room(room) {
                return Ok(permissions);
            }
        }

        let permissions = self.compute(room, user_id).await?;

        // Extend the cached snapshot so other rooms' entries survive
        let mut snapshot = cached.unwrap_or_else(|| PermissionSnapshot::new(user_id));
        snapshot.grant(room, permissions);
        self.ctx
            .permission_cache()
            .set(
                user_id,
                snapshot,
                self.ctx.config().cache.permission_ttl(),
            )
            .await?;

        Ok(permissions)
    }

    /// Require a permission in a room; fails with `denial` when absent
    #[instrument(skip(self))]
    pub async fn ensure(
        &self,
        room: RoomId,
        user_id: Snowflake,
        required: Permissions,
        denial: DomainError,
    ) -> ServiceResult<()> {
        if self.permissions_for(room, user_id).await?.has(required) {
            Ok(())
        } else {
            Err(denial.into())
        }
    }

    async fn compute(&self, room: RoomId, user_id: Snowflake) -> ServiceResult<Permissions> {
        match room {
            RoomId::Conversation(id) => {
                let conversation = self
                    .ctx
                    .conversation_repo()
                    .get_by_id(id)
                    .await?
                    .ok_or(DomainError::ConversationNotFound(id))?;

                // Conversations are flat: every participant is a full member
                if conversation.is_participant(user_id) {
                    Ok(Permissions::MEMBER)
                } else {
                    Ok(Permissions::empty())
                }
            }
            RoomId::Channel(id) => {
                let channel = self
                    .ctx
                    .channel_repo()
                    .get_by_id(id)
                    .await?
                    .ok_or(DomainError::ChannelNotFound(id))?;

                if channel.is_owner(user_id) {
                    Ok(Permissions::MODERATOR | Permissions::ADMINISTRATOR)
                } else if channel.is_moderator(user_id) {
                    Ok(Permissions::MODERATOR)
                } else if channel.is_member(user_id) {
                    Ok(Permissions::MEMBER)
                } else {
                    Ok(Permissions::empty())
                }
            }
        }
    }
}
