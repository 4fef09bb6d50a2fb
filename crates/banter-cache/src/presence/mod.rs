//! Distributed presence counts
//!
//! A user is Online iff their connection count across all processes is
//! non-zero. The connection registry tracks local connections; this store
//! answers the cluster-wide question.

mod memory;
mod redis;

use async_trait::async_trait;
use banter_core::Snowflake;

use crate::pool::CacheResult;

pub use memory::MemoryPresenceStore;
pub use redis::RedisPresenceStore;

/// Capability interface over the global connection counter
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Record one more connection; returns the global count after increment
    async fn connection_added(&self, user_id: Snowflake) -> CacheResult<i64>;

    /// Record one fewer connection; returns the global count after
    /// decrement, floored at zero
    async fn connection_removed(&self, user_id: Snowflake) -> CacheResult<i64>;

    /// Whether any process holds a connection for this user
    async fn is_online(&self, user_id: Snowflake) -> CacheResult<bool>;

    /// Current global connection count
    async fn online_count(&self, user_id: Snowflake) -> CacheResult<i64>;
}
