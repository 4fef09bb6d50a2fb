//! Event dispatcher
//!
//! The single pump between the backplane and this process's registry.
//! Each envelope gets a process-local monotone sequence number before
//! fan-out, so every connection observes a shared, gap-detectable order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use banter_cache::Backplane;
use tokio::sync::broadcast;

use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;

/// Routes backplane envelopes to local room subscribers
pub struct EventDispatcher {
    registry: Arc<ConnectionRegistry>,
    backplane: Arc<dyn Backplane>,
    running: Arc<AtomicBool>,
    sequence: AtomicU64,
}

impl EventDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, backplane: Arc<dyn Backplane>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            backplane,
            running: Arc::new(AtomicBool::new(false)),
            sequence: AtomicU64::new(0),
        })
    }

    /// Spawn the dispatch loop; a second start is a no-op
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    /// Flip the shutdown flag; the loop exits on its next wakeup
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher stopping");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sequence of the last dispatched event
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run(&self) {
        let mut receiver = self.backplane.events();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(envelope) => {
                    let seq = self.next_sequence();
                    let frame = ServerEvent::Event {
                        room: envelope.room,
                        seq,
                        event: envelope.event,
                    };
                    let sent = self.registry.send_to_room(envelope.room, &frame);
                    tracing::trace!(room = %envelope.room, seq, sent, "Event dispatched");
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Dropped events surface to clients as sequence gaps
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Backplane event stream closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("running", &self.is_running())
            .field("sequence", &self.current_sequence())
            .finish()
    }
}
