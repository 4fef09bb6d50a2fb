//! Redis pub/sub backplane
//!
//! Publishes envelopes through the shared pool and runs a dedicated
//! subscriber task on its own pub/sub connection. The task is driven by a
//! control channel (subscribe/unsubscribe/shutdown) and reconnects with
//! resubscribe after transport errors.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use banter_core::RoomId;
use futures_util::StreamExt;
use redis::{AsyncCommands, Client};
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

use crate::backplane::{Backplane, BackplaneError, BackplaneResult, EventEnvelope};
use crate::pool::RedisPool;

/// Redis backplane configuration
#[derive(Debug, Clone)]
pub struct RedisBackplaneConfig {
    /// Redis connection URL for the subscriber connection
    pub redis_url: String,
    /// Buffer size of the local delivery channel
    pub broadcast_buffer: usize,
    /// Delay before reconnecting the subscriber after an error
    pub reconnect_delay_ms: u64,
}

impl Default for RedisBackplaneConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Commands for the subscriber task
#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(String),
    Unsubscribe(String),
    Shutdown,
}

/// Cross-process backplane over Redis pub/sub
pub struct RedisBackplane {
    instance_id: Uuid,
    pool: RedisPool,
    /// Channel names the subscriber task keeps subscribed across reconnects
    subscribed: Arc<RwLock<HashSet<String>>>,
    events_tx: broadcast::Sender<EventEnvelope>,
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl RedisBackplane {
    /// Create the backplane and start the background subscriber task
    pub fn new(pool: RedisPool, config: RedisBackplaneConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(32);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(Self::listener_loop(
            config,
            Arc::clone(&subscribed),
            events_tx.clone(),
            control_rx,
        ));

        Self {
            instance_id: Uuid::new_v4(),
            pool,
            subscribed,
            events_tx,
            control_tx,
        }
    }

    /// Stop the subscriber task
    pub async fn shutdown(&self) -> BackplaneResult<()> {
        self.control_tx
            .send(SubscriberCommand::Shutdown)
            .await
            .map_err(|_| BackplaneError::Closed)
    }

    /// Channel names currently subscribed
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    async fn listener_loop(
        config: RedisBackplaneConfig,
        subscribed: Arc<RwLock<HashSet<String>>>,
        events_tx: broadcast::Sender<EventEnvelope>,
        mut control_rx: mpsc::Receiver<SubscriberCommand>,
    ) {
        loop {
            match Self::run_listener(&config, &subscribed, &events_tx, &mut control_rx).await {
                Ok(true) => {
                    tracing::info!("Backplane subscriber shutting down");
                    break;
                }
                Ok(false) => {
                    tracing::warn!("Backplane pub/sub stream ended, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Backplane subscriber error, reconnecting");
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        config.reconnect_delay_ms,
                    ))
                    .await;
                }
            }
        }
    }

    /// Run the subscriber until error, stream end, or shutdown.
    /// Returns Ok(true) on shutdown.
    async fn run_listener(
        config: &RedisBackplaneConfig,
        subscribed: &Arc<RwLock<HashSet<String>>>,
        events_tx: &broadcast::Sender<EventEnvelope>,
        control_rx: &mut mpsc::Receiver<SubscriberCommand>,
    ) -> BackplaneResult<bool> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        // Resubscribe to everything we held before the reconnect
        {
            let channels = subscribed.read().await;
            for channel in channels.iter() {
                pubsub.subscribe(channel).await?;
            }
        }

        tracing::info!("Backplane subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(msg) => {
                            let channel: String = msg.get_channel_name().to_string();
                            let payload: String = msg.get_payload().unwrap_or_default();

                            match EventEnvelope::from_json(&payload) {
                                Ok(envelope) => {
                                    // A send error only means no local receiver
                                    let _ = events_tx.send(envelope);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        channel = %channel,
                                        error = %e,
                                        "Dropping malformed backplane payload"
                                    );
                                }
                            }
                        }
                        None => return Ok(false),
                    }
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(SubscriberCommand::Subscribe(channel)) => {
                            // The message stream borrows pubsub exclusively
                            drop(stream);
                            if let Err(e) = pubsub.subscribe(&channel).await {
                                tracing::error!(channel = %channel, error = %e, "Failed to subscribe");
                            } else {
                                subscribed.write().await.insert(channel.clone());
                                tracing::debug!(channel = %channel, "Subscribed to room channel");
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Unsubscribe(channel)) => {
                            drop(stream);
                            if let Err(e) = pubsub.unsubscribe(&channel).await {
                                tracing::error!(channel = %channel, error = %e, "Failed to unsubscribe");
                            } else {
                                subscribed.write().await.remove(&channel);
                                tracing::debug!(channel = %channel, "Unsubscribed from room channel");
                            }
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Shutdown) | None => {
                            return Ok(true);
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Backplane for RedisBackplane {
    async fn publish(&self, envelope: EventEnvelope) -> BackplaneResult<()> {
        let channel = envelope.room.to_string();
        let payload = envelope.to_json()?;

        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(&channel, &payload).await?;

        tracing::debug!(
            channel = %channel,
            event_type = %envelope.event.event_type(),
            receivers,
            "Published event"
        );
        Ok(())
    }

    async fn subscribe(&self, room: RoomId) -> BackplaneResult<()> {
        self.control_tx
            .send(SubscriberCommand::Subscribe(room.to_string()))
            .await
            .map_err(|_| BackplaneError::Closed)
    }

    async fn unsubscribe(&self, room: RoomId) -> BackplaneResult<()> {
        self.control_tx
            .send(SubscriberCommand::Unsubscribe(room.to_string()))
            .await
            .map_err(|_| BackplaneError::Closed)
    }

    fn events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events_tx.subscribe()
    }

    fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}
