//! Repository traits (ports) - persistence contracts per aggregate
//!
//! The domain layer defines what it needs; storage adapters provide the
//! implementation. Each mutation is transactional for a single aggregate,
//! and `update` surfaces `Conflict` on a concurrent write.

use async_trait::async_trait;

use crate::entities::{Channel, Conversation, Message};
use crate::error::DomainError;
use crate::value_objects::{RoomId, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Pagination options for message listings
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageQuery {
    /// Only messages with an id strictly before this one
    pub before: Option<Snowflake>,
    /// Page size; implementations apply their own default when None
    pub limit: Option<usize>,
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    async fn add(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Persist a mutation; returns `Conflict` when another writer won
    async fn update(&self, conversation: &Conversation) -> RepoResult<()>;

    /// All conversations the user participates in, most recent activity first
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>>;
}

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    async fn add(&self, channel: &Channel) -> RepoResult<()>;

    /// Persist a mutation; returns `Conflict` when another writer won
    async fn update(&self, channel: &Channel) -> RepoResult<()>;

    /// All non-archived public channels
    async fn list_public(&self) -> RepoResult<Vec<Channel>>;

    /// All channels the user owns or is a member of
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn get_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    async fn add(&self, message: &Message) -> RepoResult<()>;

    /// Persist a mutation; returns `Conflict` when another writer won
    async fn update(&self, message: &Message) -> RepoResult<()>;

    /// Messages in a room, newest first
    async fn list_by_room(&self, room: RoomId, query: MessageQuery) -> RepoResult<Vec<Message>>;
}
