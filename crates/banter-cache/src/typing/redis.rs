//! Redis-backed typing indicators
//!
//! Entries live under `typing:{room}:{user_id}` with a server-side TTL, so
//! expiry is automatic and shared across processes.

use std::time::Duration;

use async_trait::async_trait;
use banter_core::{RoomId, Snowflake};
use redis::AsyncCommands;

use crate::pool::{CacheResult, RedisPool};
use crate::typing::TypingStore;

/// Key prefix for typing indicators
const TYPING_PREFIX: &str = "typing:";

/// Typing store backed by the shared Redis pool
#[derive(Debug, Clone)]
pub struct RedisTypingStore {
    pool: RedisPool,
}

impl RedisTypingStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(room: RoomId, user_id: Snowflake) -> String {
        format!("{TYPING_PREFIX}{room}:{user_id}")
    }

    /// The user id is the final `:`-separated segment of the key
    fn user_from_key(key: &str) -> Option<Snowflake> {
        key.rsplit(':').next().and_then(|id| Snowflake::parse(id).ok())
    }
}

#[async_trait]
impl TypingStore for RedisTypingStore {
    async fn start(&self, room: RoomId, user_id: Snowflake, ttl: Duration) -> CacheResult<()> {
        let key = Self::key(room, user_id);
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(&key, 1, ttl.as_secs().max(1))
            .await?;

        tracing::trace!(room = %room, user_id = %user_id, "Typing indicator set");
        Ok(())
    }

    async fn typing_users(&self, room: RoomId) -> CacheResult<Vec<Snowflake>> {
        let pattern = format!("{TYPING_PREFIX}{room}:*");
        let keys = self.pool.scan_keys(&pattern, 100).await?;

        Ok(keys
            .iter()
            .filter_map(|key| Self::user_from_key(key))
            .collect())
    }
}
