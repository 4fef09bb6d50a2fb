//! Time-bounded permission cache
//!
//! Maps a user to their computed `PermissionSnapshot`. Entries expire after
//! a fixed TTL and can be invalidated explicitly; expired entries are
//! treated as misses and removed lazily by the read that observes them.
//! Handlers that mutate role/membership state invalidate only after the
//! repository write has landed.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use banter_core::{PermissionSnapshot, Snowflake};

use crate::pool::CacheResult;

pub use memory::MemoryPermissionCache;
pub use redis::RedisPermissionCache;

/// Capability interface over the permission cache backend
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Look up a cached snapshot; expired entries count as misses
    async fn get(&self, user_id: Snowflake) -> CacheResult<Option<PermissionSnapshot>>;

    /// Store a snapshot for the given TTL
    async fn set(
        &self,
        user_id: Snowflake,
        snapshot: PermissionSnapshot,
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Drop a single user's entry
    async fn invalidate(&self, user_id: Snowflake) -> CacheResult<()>;

    /// Drop every entry
    async fn invalidate_all(&self) -> CacheResult<()>;
}
