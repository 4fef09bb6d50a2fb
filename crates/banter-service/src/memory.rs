//! In-memory repositories
//!
//! Hash-map backed implementations of the repository ports. These are the
//! storage layer for single-process deployments and for the integration
//! tests; a database adapter plugs in behind the same traits.

use std::collections::HashMap;

use async_trait::async_trait;
use banter_core::entities::{Channel, ChannelVisibility, Conversation, Message};
use banter_core::traits::{
    ChannelRepository, ConversationRepository, MessageQuery, MessageRepository, RepoResult,
};
use banter_core::{DomainError, RoomId, Snowflake};
use tokio::sync::RwLock;

/// Page size applied when a message listing gives no limit
const DEFAULT_MESSAGE_PAGE: usize = 50;

/// In-memory conversation store
#[derive(Default)]
pub struct InMemoryConversationRepository {
    items: RwLock<HashMap<Snowflake, Conversation>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn add(&self, conversation: &Conversation) -> RepoResult<()> {
        self.items
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> RepoResult<()> {
        let mut items = self.items.write().await;
        if !items.contains_key(&conversation.id) {
            return Err(DomainError::ConversationNotFound(conversation.id));
        }
        items.insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let mut result: Vec<Conversation> = self
            .items
            .read()
            .await
            .values()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();
        // Most recent activity first; untouched conversations sort last by id
        result.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(result)
    }
}

/// In-memory channel store
#[derive(Default)]
pub struct InMemoryChannelRepository {
    items: RwLock<HashMap<Snowflake, Channel>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn add(&self, channel: &Channel) -> RepoResult<()> {
        self.items.write().await.insert(channel.id, channel.clone());
        Ok(())
    }

    async fn update(&self, channel: &Channel) -> RepoResult<()> {
        let mut items = self.items.write().await;
        if !items.contains_key(&channel.id) {
            return Err(DomainError::ChannelNotFound(channel.id));
        }
        items.insert(channel.id, channel.clone());
        Ok(())
    }

    async fn list_public(&self) -> RepoResult<Vec<Channel>> {
        let mut result: Vec<Channel> = self
            .items
            .read()
            .await
            .values()
            .filter(|c| c.visibility == ChannelVisibility::Public && !c.archived)
            .cloned()
            .collect();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }

    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let mut result: Vec<Channel> = self
            .items
            .read()
            .await
            .values()
            .filter(|c| c.is_member(user_id))
            .cloned()
            .collect();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }
}

/// In-memory message store
#[derive(Default)]
pub struct InMemoryMessageRepository {
    items: RwLock<HashMap<Snowflake, Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn add(&self, message: &Message) -> RepoResult<()> {
        self.items.write().await.insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> RepoResult<()> {
        let mut items = self.items.write().await;
        if !items.contains_key(&message.id) {
            return Err(DomainError::MessageNotFound(message.id));
        }
        items.insert(message.id, message.clone());
        Ok(())
    }

    async fn list_by_room(&self, room: RoomId, query: MessageQuery) -> RepoResult<Vec<Message>> {
        let limit = query.limit.unwrap_or(DEFAULT_MESSAGE_PAGE);

        let mut result: Vec<Message> = self
            .items
            .read()
            .await
            .values()
            .filter(|m| m.room == room)
            .filter(|m| query.before.is_none_or(|cursor| m.id < cursor))
            .cloned()
            .collect();
        // Snowflakes are time-ordered, so id order is creation order
        result.sort_by(|a, b| b.id.cmp(&a.id));
        result.truncate(limit);
        Ok(result)
    }
}
