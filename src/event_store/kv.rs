// Copyright (c) 2025 - Cowboy AI, Inc.

//! Key-Value Backed Event Store
//!
//! Streams live under `events/<stream id>`, one serialized [`StoredEvent`]
//! per entry. After an append commits, each envelope can be handed to the
//! ingest queue. That publish is best-effort: a failed enqueue is logged and
//! the append still succeeds, since the events are already durable.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Appended, CommandMetadata, EventRepository, StoredEvent};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::kv::KvStore;
use crate::message::Tagged;

const STREAM_PREFIX: &str = "events/";

/// Event repository over a shared [`KvStore`] handle
#[derive(Debug)]
pub struct KvEventRepository<K> {
    kv: Arc<K>,
    publish: bool,
}

impl<K> Clone for KvEventRepository<K> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            publish: self.publish,
        }
    }
}

impl<K: KvStore> KvEventRepository<K> {
    /// Create a repository; with `publish` set, appended events are enqueued
    pub fn new(kv: Arc<K>, publish: bool) -> Self {
        Self { kv, publish }
    }

    fn stream_key(stream_id: &str) -> String {
        format!("{STREAM_PREFIX}{stream_id}")
    }

    async fn publish(&self, stream_id: &str, values: Vec<serde_json::Value>) {
        for value in values {
            if let Err(err) = self.kv.enqueue(value).await {
                warn!(stream = %stream_id, error = %err, "Failed to enqueue appended event");
            }
        }
    }
}

#[async_trait]
impl<K, E> EventRepository<E> for KvEventRepository<K>
where
    K: KvStore,
    E: Serialize + DeserializeOwned + Tagged + Send + Sync + 'static,
{
    async fn fetch(&self, stream_id: &str) -> InfrastructureResult<Vec<StoredEvent<E>>> {
        let values = self.kv.read_stream(&Self::stream_key(stream_id)).await?;

        values
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(InfrastructureError::deserialization))
            .collect()
    }

    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<E>,
        metadata: &CommandMetadata,
    ) -> InfrastructureResult<Appended<E>> {
        let recorded_at = Utc::now();
        let stored: Vec<StoredEvent<E>> = events
            .into_iter()
            .zip(expected_version + 1..)
            .map(|(event, version)| StoredEvent::new(stream_id, version, metadata, recorded_at, event))
            .collect();

        let values = stored
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let published = if self.publish { values.clone() } else { Vec::new() };

        let version = self
            .kv
            .append(&Self::stream_key(stream_id), expected_version, values)
            .await?;

        debug!(stream = %stream_id, version, appended = stored.len(), "Appended events");

        self.publish(stream_id, published).await;

        Ok(Appended {
            version,
            events: stored,
        })
    }
}
