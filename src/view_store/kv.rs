// Copyright (c) 2025 - Cowboy AI, Inc.

//! Key-Value Backed View State Store
//!
//! Records live under `view/<key>` as JSON.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ViewRecord, ViewStateRepository};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::kv::KvStore;

const VIEW_PREFIX: &str = "view/";

/// View state repository over a shared [`KvStore`] handle
#[derive(Debug)]
pub struct KvViewStateRepository<K> {
    kv: Arc<K>,
}

impl<K> Clone for KvViewStateRepository<K> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<K: KvStore> KvViewStateRepository<K> {
    /// Create a repository over `kv`
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    fn key(key: &str) -> String {
        format!("{VIEW_PREFIX}{key}")
    }

    /// Every stored view state, by view key
    pub async fn list_states<S>(&self) -> InfrastructureResult<Vec<(String, S)>>
    where
        S: DeserializeOwned,
    {
        self.kv
            .list(VIEW_PREFIX)
            .await?
            .into_iter()
            .map(|(key, value)| {
                let record: ViewRecord<S> =
                    serde_json::from_value(value).map_err(InfrastructureError::deserialization)?;
                let key = key.trim_start_matches(VIEW_PREFIX).to_string();
                Ok((key, record.state))
            })
            .collect()
    }
}

#[async_trait]
impl<K, S> ViewStateRepository<S> for KvViewStateRepository<K>
where
    K: KvStore,
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_state(&self, key: &str) -> InfrastructureResult<Option<ViewRecord<S>>> {
        match self.kv.get(&Self::key(key)).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(InfrastructureError::deserialization),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, record: &ViewRecord<S>) -> InfrastructureResult<()> {
        let value = serde_json::to_value(record)?;
        self.kv.put(&Self::key(key), value).await
    }
}
