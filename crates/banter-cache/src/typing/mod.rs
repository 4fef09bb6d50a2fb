//! Expiring typing indicators
//!
//! A typing entry is a (room, user) key with a deadline. Clients renew
//! every few seconds while the user keeps typing; absence of renewal means
//! stopped, which also covers abrupt disconnects. There is no explicit
//! stop operation.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use banter_core::{RoomId, Snowflake};

use crate::pool::CacheResult;

pub use memory::MemoryTypingStore;
pub use redis::RedisTypingStore;

/// Capability interface over the typing-indicator store
#[async_trait]
pub trait TypingStore: Send + Sync {
    /// Start or renew a typing indicator for the given TTL
    async fn start(&self, room: RoomId, user_id: Snowflake, ttl: Duration) -> CacheResult<()>;

    /// Users currently typing in a room; expired entries are excluded
    async fn typing_users(&self, room: RoomId) -> CacheResult<Vec<Snowflake>>;
}
