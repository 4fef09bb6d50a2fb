//! Test helpers for integration tests
//!
//! Builds a full single-process stack: in-memory repositories, memory
//! caches, the local backplane, a connection registry, and a running
//! event dispatcher. Sessions connect through the same code paths a
//! transport would use.

use std::sync::Arc;
use std::time::Duration;

use banter_cache::{
    LocalBackplane, MemoryPermissionCache, MemoryPresenceStore, MemoryTypingStore,
};
use banter_common::AppConfig;
use banter_core::{Snowflake, SnowflakeGenerator};
use banter_realtime::{ConnectionRegistry, EventDispatcher, RealtimeSession, ServerEvent};
use banter_service::{
    InMemoryChannelRepository, InMemoryConversationRepository, InMemoryMessageRepository,
    ServiceContext, ServiceResult,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// How long a test waits for a frame before giving up
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// A full in-process realtime stack
pub struct TestEnv {
    pub ctx: ServiceContext,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl TestEnv {
    /// Build the stack and start the dispatcher
    pub fn start() -> Self {
        let ctx = ServiceContext::builder()
            .conversation_repo(Arc::new(InMemoryConversationRepository::new()))
            .channel_repo(Arc::new(InMemoryChannelRepository::new()))
            .message_repo(Arc::new(InMemoryMessageRepository::new()))
            .permission_cache(Arc::new(MemoryPermissionCache::new()))
            .presence_store(Arc::new(MemoryPresenceStore::new()))
            .typing_store(Arc::new(MemoryTypingStore::new()))
            .backplane(Arc::new(LocalBackplane::new()))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .config(AppConfig::default())
            .build()
            .expect("test context");

        let registry = ConnectionRegistry::new_shared();
        let dispatcher = EventDispatcher::new(registry.clone(), ctx.backplane_arc());
        dispatcher.start();

        Self {
            ctx,
            registry,
            dispatcher,
        }
    }

    /// Connect a session for the given user and consume the Ready frame
    pub async fn connect(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<(RealtimeSession, mpsc::UnboundedReceiver<ServerEvent>)> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session =
            RealtimeSession::connect(self.ctx.clone(), self.registry.clone(), user_id, tx).await?;

        match recv_frame(&mut rx).await {
            ServerEvent::Ready { connection_id } => {
                assert_eq!(connection_id, session.connection_id());
            }
            other => panic!("expected Ready frame, got {other:?}"),
        }

        Ok((session, rx))
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        self.dispatcher.stop();
    }
}

/// Receive the next frame or panic after the timeout
pub async fn recv_frame(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("frame channel closed")
}

/// Receive frames until an Event frame arrives; returns (seq, event type)
pub async fn recv_event(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> (u64, String) {
    loop {
        match recv_frame(rx).await {
            ServerEvent::Event { seq, event, .. } => {
                return (seq, event.event_type().to_string())
            }
            ServerEvent::Ready { .. } => {}
            ServerEvent::Error { code, message } => {
                panic!("unexpected error frame: {code}: {message}")
            }
        }
    }
}

/// Receive Event frames until one of the given type arrives, skipping
/// unrelated events (e.g. presence churn from other sessions)
pub async fn recv_event_of(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    event_type: &str,
) -> u64 {
    loop {
        let (seq, ty) = recv_event(rx).await;
        if ty == event_type {
            return seq;
        }
    }
}

/// Assert that no frame arrives within a short window
pub async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) {
    let result = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(result.is_err(), "expected no frame, got {result:?}");
}

/// Assert that no Event frame of the given type arrives within a short
/// window; other frames are ignored
pub async fn assert_no_event_of(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    event_type: &str,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(150);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match timeout(remaining, rx.recv()).await {
            Ok(Some(ServerEvent::Event { event, .. })) => {
                assert_ne!(event.event_type(), event_type, "unexpected {event_type}");
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return,
        }
    }
}
