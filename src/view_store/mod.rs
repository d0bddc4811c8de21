// Copyright (c) 2025 - Cowboy AI, Inc.

//! View State Storage
//!
//! Keyed storage for the current state of a materialized view. Each key holds
//! a [`ViewRecord`]: the folded state plus, per source stream, the highest
//! event version already applied. The materialized view uses those positions
//! to recognise a redelivered event and skip it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::InfrastructureResult;

pub mod kv;

pub use kv::KvViewStateRepository;

/// Keyed storage for view state
#[async_trait]
pub trait ViewStateRepository<S>: Send + Sync {
    /// Current record for `key`, absent when nothing was projected yet
    async fn fetch_state(&self, key: &str) -> InfrastructureResult<Option<ViewRecord<S>>>;

    /// Replace the record for `key`
    async fn save(&self, key: &str, record: &ViewRecord<S>) -> InfrastructureResult<()>;
}

/// Persisted view state with the stream positions folded into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord<S> {
    /// Folded view state
    pub state: S,

    /// Highest applied version per source stream
    pub positions: BTreeMap<String, u64>,
}

impl<S> ViewRecord<S> {
    /// Record with no applied events
    pub fn new(state: S) -> Self {
        Self {
            state,
            positions: BTreeMap::new(),
        }
    }

    /// Highest version applied from `stream_id`
    pub fn position(&self, stream_id: &str) -> Option<u64> {
        self.positions.get(stream_id).copied()
    }

    /// Whether the event at `version` of `stream_id` is already folded in
    pub fn has_applied(&self, stream_id: &str, version: u64) -> bool {
        self.position(stream_id)
            .is_some_and(|applied| applied >= version)
    }

    /// Note that `version` of `stream_id` has been applied
    pub fn advance(&mut self, stream_id: &str, version: u64) {
        let position = self.positions.entry(stream_id.to_string()).or_insert(0);
        *position = (*position).max(version);
    }
}
