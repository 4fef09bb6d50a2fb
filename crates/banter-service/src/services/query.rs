//! Read-side queries
//!
//! Listing operations over the repositories; no mutations, no events.

use banter_core::entities::{Channel, Conversation, Message};
use banter_core::traits::MessageQuery;
use banter_core::{RoomId, Snowflake};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Largest page a message listing will return
pub const MAX_MESSAGE_PAGE: usize = 100;

/// Query service
pub struct QueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> QueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Conversations the user participates in, most recent activity first
    #[instrument(skip(self))]
    pub async fn conversations_for_user(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<Conversation>> {
        Ok(self.ctx.conversation_repo().list_for_user(user_id).await?)
    }

    /// All non-archived public channels
    #[instrument(skip(self))]
    pub async fn public_channels(&self) -> ServiceResult<Vec<Channel>> {
        Ok(self.ctx.channel_repo().list_public().await?)
    }

    /// Channels the user owns or is a member of
    #[instrument(skip(self))]
    pub async fn channels_for_user(&self, user_id: Snowflake) -> ServiceResult<Vec<Channel>> {
        Ok(self.ctx.channel_repo().list_for_user(user_id).await?)
    }

    /// Messages in a room, newest first, paged by id cursor
    #[instrument(skip(self))]
    pub async fn messages(
        &self,
        room: RoomId,
        before: Option<Snowflake>,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Message>> {
        if let Some(limit) = limit {
            if limit == 0 || limit > MAX_MESSAGE_PAGE {
                return Err(ServiceError::validation(format!(
                    "limit must be between 1 and {MAX_MESSAGE_PAGE}"
                )));
            }
        }

        Ok(self
            .ctx
            .message_repo()
            .list_by_room(room, MessageQuery { before, limit })
            .await?)
    }
}
