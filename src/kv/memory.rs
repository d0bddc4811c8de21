// Copyright (c) 2025 - Cowboy AI, Inc.

//! In-Memory Key-Value Store
//!
//! Process-local implementation of [`KvStore`]:
//! - entries in a `BTreeMap` so prefix listing comes back in key order
//! - streams appended under one mutex, making the version check and the
//!   write a single atomic step
//! - a bounded `mpsc` channel as the ingest queue (FIFO, single consumer)

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::debug;

use super::{queue_error, KvStore, QueueListener, QueueMessage};
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Default ingest queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// In-memory store with a bounded ingest queue
#[derive(Debug)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, Value>>,
    streams: Mutex<HashMap<String, Vec<Value>>>,
    producer: Mutex<Option<mpsc::Sender<QueueMessage>>>,
    listener: Mutex<Option<QueueListener>>,
}

impl MemoryKv {
    /// Create a store whose queue buffers up to `queue_capacity` messages
    pub fn new(queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let listener = QueueListener::new(receiver);

        Self {
            entries: RwLock::new(BTreeMap::new()),
            streams: Mutex::new(HashMap::new()),
            producer: Mutex::new(Some(sender)),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Stop accepting queue messages
    ///
    /// Buffered messages are still delivered; the listener then sees the
    /// end of the queue.
    pub async fn close_queue(&self) {
        if self.producer.lock().await.take().is_some() {
            debug!("Ingest queue closed");
        }
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> InfrastructureResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> InfrastructureResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> InfrastructureResult<Vec<(String, Value)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn read_stream(&self, stream: &str) -> InfrastructureResult<Vec<Value>> {
        Ok(self
            .streams
            .lock()
            .await
            .get(stream)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(
        &self,
        stream: &str,
        expected_version: u64,
        values: Vec<Value>,
    ) -> InfrastructureResult<u64> {
        let mut streams = self.streams.lock().await;
        let entries = streams.entry(stream.to_string()).or_default();

        let actual = entries.len() as u64;
        if actual != expected_version {
            return Err(InfrastructureError::ConcurrencyConflict {
                stream: stream.to_string(),
                expected: expected_version,
                actual,
            });
        }

        entries.extend(values);
        Ok(entries.len() as u64)
    }

    async fn enqueue(&self, payload: Value) -> InfrastructureResult<()> {
        let producer = self.producer.lock().await;
        let sender = producer.as_ref().ok_or(InfrastructureError::QueueClosed)?;
        sender
            .try_send(QueueMessage::new(payload))
            .map_err(queue_error)
    }

    async fn listen(&self) -> InfrastructureResult<QueueListener> {
        self.listener
            .lock()
            .await
            .take()
            .ok_or(InfrastructureError::ListenerTaken)
    }
}
