//! Service context - dependency container for services
//!
//! Holds the repositories, volatile stores, backplane, and id generator
//! every service needs. Built once at startup and shared by reference.

use std::sync::Arc;

use banter_cache::{Backplane, EventEnvelope, PermissionCache, PresenceStore, TypingStore};
use banter_common::AppConfig;
use banter_core::traits::{ChannelRepository, ConversationRepository, MessageRepository};
use banter_core::{DomainEvent, RoomId, Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    conversation_repo: Arc<dyn ConversationRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    message_repo: Arc<dyn MessageRepository>,

    permission_cache: Arc<dyn PermissionCache>,
    presence_store: Arc<dyn PresenceStore>,
    typing_store: Arc<dyn TypingStore>,
    backplane: Arc<dyn Backplane>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    config: Arc<AppConfig>,
}

impl ServiceContext {
    #[must_use]
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn permission_cache(&self) -> &dyn PermissionCache {
        self.permission_cache.as_ref()
    }

    pub fn presence_store(&self) -> &dyn PresenceStore {
        self.presence_store.as_ref()
    }

    pub fn typing_store(&self) -> &dyn TypingStore {
        self.typing_store.as_ref()
    }

    pub fn backplane(&self) -> &dyn Backplane {
        self.backplane.as_ref()
    }

    /// Owning handle to the backplane, for long-lived consumers
    pub fn backplane_arc(&self) -> Arc<dyn Backplane> {
        self.backplane.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Publish an event to its room, best-effort.
    ///
    /// Runs after the aggregate write has already landed, so a transport
    /// failure is logged and never rolls the mutation back; clients recover
    /// missed realtime updates on their next full fetch.
    pub async fn publish_event(&self, room: RoomId, event: DomainEvent) {
        let envelope = EventEnvelope::new(room, event, self.backplane.instance_id());
        if let Err(e) = self.backplane.publish(envelope).await {
            tracing::warn!(room = %room, error = %e, "Event fan-out failed after successful write");
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for creating a ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    permission_cache: Option<Arc<dyn PermissionCache>>,
    presence_store: Option<Arc<dyn PresenceStore>>,
    typing_store: Option<Arc<dyn TypingStore>>,
    backplane: Option<Arc<dyn Backplane>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    config: Option<AppConfig>,
}

impl ServiceContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn permission_cache(mut self, cache: Arc<dyn PermissionCache>) -> Self {
        self.permission_cache = Some(cache);
        self
    }

    #[must_use]
    pub fn presence_store(mut self, store: Arc<dyn PresenceStore>) -> Self {
        self.presence_store = Some(store);
        self
    }

    #[must_use]
    pub fn typing_store(mut self, store: Arc<dyn TypingStore>) -> Self {
        self.typing_store = Some(store);
        self
    }

    #[must_use]
    pub fn backplane(mut self, backplane: Arc<dyn Backplane>) -> Self {
        self.backplane = Some(backplane);
        self
    }

    #[must_use]
    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            conversation_repo: required(self.conversation_repo, "conversation_repo")?,
            channel_repo: required(self.channel_repo, "channel_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            permission_cache: required(self.permission_cache, "permission_cache")?,
            presence_store: required(self.presence_store, "presence_store")?,
            typing_store: required(self.typing_store, "typing_store")?,
            backplane: required(self.backplane, "backplane")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
            config: Arc::new(self.config.unwrap_or_default()),
        })
    }
}
