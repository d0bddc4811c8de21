// Copyright (c) 2025 - Cowboy AI, Inc.

//! Ingest Queue Consumer
//!
//! A single consumer task drains the ingest queue and hands every message to
//! a [`QueueHandler`]. Delivery is at least once and keeps queue order:
//!
//! - a failed message is retried in place, before the next message is
//!   received, so later events of the same stream never overtake it
//! - after `max_attempts` failures it is dropped and logged
//!
//! The consumer ends when the queue is closed and drained.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::InfrastructureResult;
use crate::kv::{QueueListener, QueueMessage};

/// Trait for handling messages from the ingest queue
#[async_trait]
pub trait QueueHandler: Send + Sync {
    /// Handle one delivered payload
    ///
    /// An error triggers a retry until the attempt limit is reached.
    async fn handle(&self, payload: Value) -> InfrastructureResult<()>;
}

/// Delivery counters of a finished consumer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Messages handled successfully
    pub delivered: u64,
    /// Failed deliveries that were retried
    pub redelivered: u64,
    /// Messages given up on
    pub dropped: u64,
}

/// Single consumer of the ingest queue
pub struct QueueConsumer<H> {
    listener: QueueListener,
    handler: Arc<H>,
    max_attempts: u32,
}

impl<H> QueueConsumer<H>
where
    H: QueueHandler + 'static,
{
    /// Create a consumer giving each message up to `max_attempts` deliveries
    pub fn new(listener: QueueListener, handler: Arc<H>, max_attempts: u32) -> Self {
        Self {
            listener,
            handler,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run the consumer on its own task
    pub fn spawn(self) -> JoinHandle<ConsumerStats> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until it is closed
    pub async fn run(mut self) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        info!(max_attempts = self.max_attempts, "Ingest queue consumer started");

        while let Some(message) = self.listener.recv().await {
            self.deliver(message, &mut stats).await;
        }

        info!(
            delivered = stats.delivered,
            redelivered = stats.redelivered,
            dropped = stats.dropped,
            "Ingest queue consumer stopped"
        );
        stats
    }

    /// Hand one message to the handler until it succeeds or runs out of
    /// attempts
    async fn deliver(&self, mut message: QueueMessage, stats: &mut ConsumerStats) {
        loop {
            match self.handler.handle(message.payload.clone()).await {
                Ok(()) => {
                    debug!(message_id = %message.id, attempt = message.attempt, "Message handled");
                    stats.delivered += 1;
                    return;
                }
                Err(err) if message.attempt < self.max_attempts => {
                    warn!(
                        message_id = %message.id,
                        attempt = message.attempt,
                        error = %err,
                        "Message failed, retrying"
                    );
                    stats.redelivered += 1;
                    message = message.next_attempt();
                    tokio::task::yield_now().await;
                }
                Err(err) => {
                    error!(
                        message_id = %message.id,
                        attempt = message.attempt,
                        error = %err,
                        "Message failed, giving up"
                    );
                    stats.dropped += 1;
                    return;
                }
            }
        }
    }
}
