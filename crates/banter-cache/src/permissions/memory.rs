//! In-process permission cache backed by DashMap
//!
//! DashMap's shard locking gives per-key exclusivity while cross-key
//! operations proceed in parallel.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use banter_core::{PermissionSnapshot, Snowflake};
use dashmap::DashMap;

use crate::pool::CacheResult;
use crate::permissions::PermissionCache;

#[derive(Debug, Clone)]
struct CachedEntry {
    snapshot: PermissionSnapshot,
    expires_at: Instant,
}

/// In-memory permission cache; the default backend when no Redis URL is
/// configured, and the one unit tests run against
#[derive(Debug, Default)]
pub struct MemoryPermissionCache {
    entries: DashMap<Snowflake, CachedEntry>,
}

impl MemoryPermissionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, counting not-yet-collected expired ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PermissionCache for MemoryPermissionCache {
    async fn get(&self, user_id: Snowflake) -> CacheResult<Option<PermissionSnapshot>> {
        let expired = match self.entries.get(&user_id) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.snapshot.clone()));
            }
            Some(_) => true,
            None => false,
        };

        // Lazy removal by the reader that observed the expiry
        if expired {
            self.entries
                .remove_if(&user_id, |_, entry| entry.expires_at <= Instant::now());
        }
        Ok(None)
    }

    async fn set(
        &self,
        user_id: Snowflake,
        snapshot: PermissionSnapshot,
        ttl: Duration,
    ) -> CacheResult<()> {
        self.entries.insert(
            user_id,
            CachedEntry {
                snapshot,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, user_id: Snowflake) -> CacheResult<()> {
        self.entries.remove(&user_id);
        Ok(())
    }

    async fn invalidate_all(&self) -> CacheResult<()> {
        self.entries.clear();
        Ok(())
    }
}
