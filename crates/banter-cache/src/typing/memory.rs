//! In-process typing indicators with lazy expiry

use std::time::{Duration, Instant};

use async_trait::async_trait;
use banter_core::{RoomId, Snowflake};
use dashmap::DashMap;

use crate::pool::CacheResult;
use crate::typing::TypingStore;

/// In-memory typing store for single-process deployments and tests
#[derive(Debug, Default)]
pub struct MemoryTypingStore {
    deadlines: DashMap<(RoomId, Snowflake), Instant>,
}

impl MemoryTypingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TypingStore for MemoryTypingStore {
    async fn start(&self, room: RoomId, user_id: Snowflake, ttl: Duration) -> CacheResult<()> {
        self.deadlines.insert((room, user_id), Instant::now() + ttl);
        Ok(())
    }

    async fn typing_users(&self, room: RoomId) -> CacheResult<Vec<Snowflake>> {
        let now = Instant::now();

        // Drop everything already expired, then collect the room's users
        self.deadlines.retain(|_, deadline| *deadline > now);

        let users = self
            .deadlines
            .iter()
            .filter(|entry| entry.key().0 == room)
            .map(|entry| entry.key().1)
            .collect();
        Ok(users)
    }
}
