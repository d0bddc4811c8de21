// Copyright (c) 2025 - Cowboy AI, Inc.

//! Event Store Abstraction
//!
//! This module defines the event storage interface used by the
//! event-sourcing aggregate, and its implementation on top of a [`KvStore`].
//!
//! # Architecture
//!
//! ```text
//! Command → Aggregate → Events → EventRepository → KvStore
//!                                      ↓
//!                               Ingest Queue → Materialized View
//! ```
//!
//! # Event Store Requirements
//!
//! 1. **Append-Only**: Events are never updated or deleted
//! 2. **Ordered**: Versions are consecutive within a stream, starting at 1
//! 3. **Optimistic**: An append names the version it was decided against
//! 4. **Atomic**: A conflicting append writes nothing
//! 5. **Correlation**: Every event records the command that caused it
//!
//! [`KvStore`]: crate::kv::KvStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InfrastructureResult;
use crate::message::Tagged;

pub mod kv;

pub use kv::KvEventRepository;

/// Append-only, per-stream event log with optimistic concurrency
#[async_trait]
pub trait EventRepository<E>: Send + Sync {
    /// Full history of a stream in ascending version order
    ///
    /// Unknown streams yield an empty vector.
    async fn fetch(&self, stream_id: &str) -> InfrastructureResult<Vec<StoredEvent<E>>>;

    /// Append `events` if the stream is still at `expected_version`
    ///
    /// Events receive consecutive versions after `expected_version`. On a
    /// version mismatch nothing is written and
    /// [`ConcurrencyConflict`](crate::errors::InfrastructureError::ConcurrencyConflict)
    /// is returned.
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<E>,
        metadata: &CommandMetadata,
    ) -> InfrastructureResult<Appended<E>>;
}

/// Metadata travelling with a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Id of this command; becomes the causation id of its events
    pub command_id: Uuid,

    /// Groups every command and event of one request flow
    pub correlation_id: Uuid,
}

impl CommandMetadata {
    /// Metadata for a command that starts a new flow
    pub fn new() -> Self {
        let command_id = Uuid::now_v7();
        Self {
            command_id,
            correlation_id: command_id,
        }
    }

    /// Metadata for a command issued within an existing flow
    pub fn correlated(correlation_id: Uuid) -> Self {
        Self {
            command_id: Uuid::now_v7(),
            correlation_id,
        }
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Stored event envelope
///
/// Wraps a domain event with its position in the stream and the metadata of
/// the command that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent<E> {
    /// Unique event ID (UUID v7 for time-ordering)
    pub event_id: Uuid,

    /// Stream (aggregate identity) this event belongs to
    pub stream_id: String,

    /// Version within the stream, starting at 1
    pub version: u64,

    /// When the event was appended
    pub recorded_at: DateTime<Utc>,

    /// Command that caused this event
    pub command_id: Uuid,

    /// Correlation ID of the request flow
    pub correlation_id: Uuid,

    /// Event tag
    pub event_type: String,

    /// The domain event
    pub data: E,
}

impl<E: Tagged> StoredEvent<E> {
    /// Wrap `data` at `version` of `stream_id`
    pub fn new(
        stream_id: impl Into<String>,
        version: u64,
        metadata: &CommandMetadata,
        recorded_at: DateTime<Utc>,
        data: E,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            stream_id: stream_id.into(),
            version,
            recorded_at,
            command_id: metadata.command_id,
            correlation_id: metadata.correlation_id,
            event_type: data.tag().to_string(),
            data,
        }
    }
}

/// Outcome of a successful append
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appended<E> {
    /// Stream version after the append
    pub version: u64,

    /// The appended envelopes, in version order
    pub events: Vec<StoredEvent<E>>,
}

impl<E> Appended<E> {
    /// The bare domain events
    pub fn domain_events(&self) -> impl Iterator<Item = &E> {
        self.events.iter().map(|stored| &stored.data)
    }
}
