//! # banter-service
//!
//! Application layer: command services over the aggregates, event
//! fan-out, read-side queries, and the in-memory repository adapters.

pub mod memory;
pub mod services;

pub use memory::{
    InMemoryChannelRepository, InMemoryConversationRepository, InMemoryMessageRepository,
};
pub use services::{
    ChannelService, ConversationService, MessageService, PermissionService, PresenceService,
    QueryService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
