//! In-process presence counters
//!
//! In local mode the process is the whole cluster, so a DashMap of counters
//! is the entire distributed count.

use async_trait::async_trait;
use banter_core::Snowflake;
use dashmap::DashMap;

use crate::pool::CacheResult;
use crate::presence::PresenceStore;

/// In-memory presence store for single-process deployments and tests
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    counts: DashMap<Snowflake, i64>,
}

impl MemoryPresenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn connection_added(&self, user_id: Snowflake) -> CacheResult<i64> {
        let mut entry = self.counts.entry(user_id).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn connection_removed(&self, user_id: Snowflake) -> CacheResult<i64> {
        let count = match self.counts.get_mut(&user_id) {
            Some(mut entry) => {
                *entry = (*entry - 1).max(0);
                *entry
            }
            None => 0,
        };

        if count == 0 {
            self.counts.remove_if(&user_id, |_, c| *c == 0);
        }
        Ok(count)
    }

    async fn is_online(&self, user_id: Snowflake) -> CacheResult<bool> {
        Ok(self.online_count(user_id).await? > 0)
    }

    async fn online_count(&self, user_id: Snowflake) -> CacheResult<i64> {
        Ok(self.counts.get(&user_id).map_or(0, |c| *c))
    }
}
