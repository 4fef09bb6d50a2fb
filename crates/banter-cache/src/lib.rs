//! # banter-cache
//!
//! Volatile-state layer: the time-bounded permission cache, distributed
//! presence counts, expiring typing indicators, and the event backplane.
//! Every store is a capability trait with an in-memory implementation
//! (single-process mode, tests) and a Redis implementation (scale-out).

pub mod backplane;
pub mod permissions;
pub mod pool;
pub mod presence;
pub mod typing;

// Re-export pool types
pub use pool::{CacheError, CacheResult, RedisPool, RedisPoolConfig, SharedRedisPool};

// Re-export permission cache types
pub use permissions::{MemoryPermissionCache, PermissionCache, RedisPermissionCache};

// Re-export presence types
pub use presence::{MemoryPresenceStore, PresenceStore, RedisPresenceStore};

// Re-export typing types
pub use typing::{MemoryTypingStore, RedisTypingStore, TypingStore};

// Re-export backplane types
pub use backplane::{
    Backplane, BackplaneError, BackplaneResult, EventEnvelope, LocalBackplane, RedisBackplane,
    RedisBackplaneConfig,
};
