//! # banter-core
//!
//! Domain layer containing entities, value objects, repository traits, and domain events.
//! This crate has zero dependencies on infrastructure (storage, transport, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelVisibility, Conversation, ConversationKind, Message, MessageKind,
    MessageState, Reaction, ReadReceipt,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    ChannelRepository, ConversationRepository, MessageQuery, MessageRepository, RepoResult,
};
pub use value_objects::{
    PermissionSnapshot, Permissions, RoomId, RoomIdParseError, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};
