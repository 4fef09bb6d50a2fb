//! Redis-backed permission cache
//!
//! Snapshots are stored as JSON under `perm:{user_id}` with a server-side
//! TTL, so expiry needs no sweeper and is shared across processes.

use std::time::Duration;

use async_trait::async_trait;
use banter_core::{PermissionSnapshot, Snowflake};

use crate::pool::{CacheResult, RedisPool};
use crate::permissions::PermissionCache;

/// Key prefix for cached permission snapshots
const PERMISSION_PREFIX: &str = "perm:";

/// Permission cache backed by the shared Redis pool
#[derive(Debug, Clone)]
pub struct RedisPermissionCache {
    pool: RedisPool,
}

impl RedisPermissionCache {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(user_id: Snowflake) -> String {
        format!("{PERMISSION_PREFIX}{user_id}")
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get(&self, user_id: Snowflake) -> CacheResult<Option<PermissionSnapshot>> {
        self.pool.get_value(&Self::key(user_id)).await
    }

    async fn set(
        &self,
        user_id: Snowflake,
        snapshot: PermissionSnapshot,
        ttl: Duration,
    ) -> CacheResult<()> {
        let ttl_seconds = ttl.as_secs().max(1);
        self.pool
            .set(&Self::key(user_id), &snapshot, Some(ttl_seconds))
            .await?;

        tracing::debug!(user_id = %user_id, ttl_seconds, "Cached permission snapshot");
        Ok(())
    }

    async fn invalidate(&self, user_id: Snowflake) -> CacheResult<()> {
        self.pool.delete(&Self::key(user_id)).await?;
        tracing::debug!(user_id = %user_id, "Invalidated permission snapshot");
        Ok(())
    }

    async fn invalidate_all(&self) -> CacheResult<()> {
        let keys = self
            .pool
            .scan_keys(&format!("{PERMISSION_PREFIX}*"), 100)
            .await?;
        let dropped = self.pool.delete_many(&keys).await?;
        tracing::debug!(dropped, "Invalidated all permission snapshots");
        Ok(())
    }
}
