//! Redis-backed presence counters
//!
//! Each user gets an INCR/DECR counter under `presence:{user_id}` with a
//! TTL refreshed on every increment, so counts from a crashed process
//! cannot pin a user online forever.

use std::time::Duration;

use async_trait::async_trait;
use banter_core::Snowflake;
use redis::AsyncCommands;

use crate::pool::{CacheResult, RedisPool};
use crate::presence::PresenceStore;

/// Key prefix for presence counters
const PRESENCE_PREFIX: &str = "presence:";

/// Presence store backed by the shared Redis pool
#[derive(Debug, Clone)]
pub struct RedisPresenceStore {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisPresenceStore {
    #[must_use]
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn key(user_id: Snowflake) -> String {
        format!("{PRESENCE_PREFIX}{user_id}")
    }
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn connection_added(&self, user_id: Snowflake) -> CacheResult<i64> {
        let key = Self::key(user_id);
        let mut conn = self.pool.get().await?;

        let count: i64 = conn.incr(&key, 1).await?;
        conn.expire::<_, bool>(&key, self.ttl.as_secs() as i64)
            .await?;

        tracing::trace!(user_id = %user_id, count, "Presence count incremented");
        Ok(count)
    }

    async fn connection_removed(&self, user_id: Snowflake) -> CacheResult<i64> {
        let key = Self::key(user_id);
        let mut conn = self.pool.get().await?;

        let count: i64 = conn.decr(&key, 1).await?;
        if count <= 0 {
            // Counter underflow after a missed increment or expired key
            conn.del::<_, ()>(&key).await?;
            return Ok(0);
        }

        tracing::trace!(user_id = %user_id, count, "Presence count decremented");
        Ok(count)
    }

    async fn is_online(&self, user_id: Snowflake) -> CacheResult<bool> {
        Ok(self.online_count(user_id).await? > 0)
    }

    async fn online_count(&self, user_id: Snowflake) -> CacheResult<i64> {
        let mut conn = self.pool.get().await?;
        let count: Option<i64> = conn.get(Self::key(user_id)).await?;
        Ok(count.unwrap_or(0).max(0))
    }
}
