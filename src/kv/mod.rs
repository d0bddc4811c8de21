// Copyright (c) 2025 - Cowboy AI, Inc.

//! Key-Value Store Abstraction
//!
//! The engine needs very little from persistence. Both repositories and the
//! ingest queue are written against this one collaborator:
//!
//! ```text
//! get / put / list         → view state
//! read_stream / append     → event streams (append is version-checked)
//! enqueue / listen         → ingest queue feeding the projection
//! ```
//!
//! A single store handle is opened by the application and injected into the
//! event repository and the view state repository, so tests can swap in
//! [`MemoryKv`] without touching either orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::errors::{InfrastructureError, InfrastructureResult};

pub mod memory;

pub use memory::MemoryKv;

/// Storage primitives required by the repositories and the queue
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a single value
    async fn get(&self, key: &str) -> InfrastructureResult<Option<Value>>;

    /// Write a single value, replacing any previous one
    async fn put(&self, key: &str, value: Value) -> InfrastructureResult<()>;

    /// All entries whose key starts with `prefix`, in key order
    async fn list(&self, prefix: &str) -> InfrastructureResult<Vec<(String, Value)>>;

    /// Every value of an ordered stream; empty when unknown
    async fn read_stream(&self, stream: &str) -> InfrastructureResult<Vec<Value>>;

    /// Append `values` if the stream length equals `expected_version`
    ///
    /// Either all values are appended and the new length is returned, or
    /// nothing is written and [`InfrastructureError::ConcurrencyConflict`]
    /// is returned.
    async fn append(
        &self,
        stream: &str,
        expected_version: u64,
        values: Vec<Value>,
    ) -> InfrastructureResult<u64>;

    /// Hand a message to the ingest queue without waiting for capacity
    async fn enqueue(&self, payload: Value) -> InfrastructureResult<()>;

    /// Take the receiving side of the ingest queue (once)
    async fn listen(&self) -> InfrastructureResult<QueueListener>;
}

/// A message travelling through the ingest queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Delivery id, stable across retries
    pub id: Uuid,

    /// 1 on first delivery, incremented on each retry
    pub attempt: u32,

    /// Serialized body
    pub payload: Value,
}

impl QueueMessage {
    /// First delivery of `payload`
    pub fn new(payload: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            attempt: 1,
            payload,
        }
    }

    /// Same message, one attempt later
    pub fn next_attempt(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }
}

/// Receiving side of the ingest queue
///
/// Holds no sender, so the queue closes once its producer is dropped and
/// the buffer is drained. Failed messages are retried by the consumer in
/// place, never sent back through the channel.
#[derive(Debug)]
pub struct QueueListener {
    receiver: mpsc::Receiver<QueueMessage>,
}

impl QueueListener {
    /// Wrap a channel receiver
    pub fn new(receiver: mpsc::Receiver<QueueMessage>) -> Self {
        Self { receiver }
    }

    /// Next message in FIFO order; `None` once the queue is closed and empty
    pub async fn recv(&mut self) -> Option<QueueMessage> {
        self.receiver.recv().await
    }
}

pub(crate) fn queue_error<T>(err: TrySendError<T>) -> InfrastructureError {
    match err {
        TrySendError::Full(_) => InfrastructureError::QueueFull,
        TrySendError::Closed(_) => InfrastructureError::QueueClosed,
    }
}
