//! Event fan-out backplane
//!
//! Routes a published domain event to every process holding a live
//! subscription for its room. Delivery is at-least-once; events published
//! by one process to the same room reach that process's own subscribers in
//! publish order, while cross-process ordering is not guaranteed.
//!
//! Two implementations: `LocalBackplane` (tokio broadcast, the degraded
//! process-local mode used when no Redis URL is configured) and
//! `RedisBackplane` (Redis pub/sub with a reconnecting subscriber task).

mod envelope;
mod local;
mod redis;

use async_trait::async_trait;
use banter_core::RoomId;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use envelope::EventEnvelope;
pub use local::LocalBackplane;
pub use redis::{RedisBackplane, RedisBackplaneConfig};

/// Error type for backplane operations
#[derive(Debug, thiserror::Error)]
pub enum BackplaneError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::pool::CacheError),

    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backplane channel closed")]
    Closed,
}

/// Result type for backplane operations
pub type BackplaneResult<T> = Result<T, BackplaneError>;

/// Cross-process publish/subscribe transport for domain events
#[async_trait]
pub trait Backplane: Send + Sync {
    /// Publish an event to a room; fire-and-forget from the caller's view
    async fn publish(&self, envelope: EventEnvelope) -> BackplaneResult<()>;

    /// Start receiving this room's events on this process
    async fn subscribe(&self, room: RoomId) -> BackplaneResult<()>;

    /// Stop receiving this room's events on this process
    async fn unsubscribe(&self, room: RoomId) -> BackplaneResult<()>;

    /// Stream of envelopes delivered to this process
    fn events(&self) -> broadcast::Receiver<EventEnvelope>;

    /// The publishing instance's identity, stamped on outgoing envelopes
    fn instance_id(&self) -> Uuid;
}
