// Copyright (c) 2025 - Cowboy AI, Inc.

//! Materialized View
//!
//! The read-side orchestrator. Handling one delivered event:
//!
//! ```text
//! 1. key     ← key(event)                 (defaults to the event's stream id)
//! 2. record  ← repository.fetch_state(key) or initial state
//! 3. skip    if record already applied this stream at this version
//! 4. state   ← view.evolve(record.state, event)
//! 5. repository.save(key, record)
//! ```
//!
//! # Delivery Assumptions
//!
//! The ingest queue delivers at least once, in FIFO order per producer. The
//! stream positions kept in each [`ViewRecord`] make redelivery harmless:
//! an event at or below the recorded position is acknowledged without
//! touching the state. Out-of-order delivery within one stream is not
//! corrected; the queue must preserve per-key order.

use tracing::debug;

use crate::errors::InfrastructureResult;
use crate::event_store::StoredEvent;
use crate::message::{Identifier, Tagged};
use crate::view::View;
use crate::view_store::{ViewRecord, ViewStateRepository};

/// Maps an event to the view key it updates
pub type KeyFunction<'a, E> = Box<dyn Fn(&E) -> String + 'a + Send + Sync>;

/// What handling one event did to the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate<S> {
    /// The event was folded in and the new state saved
    Applied {
        /// View key
        key: String,
        /// State after the event
        state: S,
    },

    /// The event was already folded in; nothing was written
    Duplicate {
        /// View key
        key: String,
        /// Unchanged state
        state: S,
    },

    /// The view owns no handler for this event
    Ignored {
        /// View key
        key: String,
    },
}

impl<S> ViewUpdate<S> {
    /// View key the event was routed to
    pub fn key(&self) -> &str {
        match self {
            ViewUpdate::Applied { key, .. }
            | ViewUpdate::Duplicate { key, .. }
            | ViewUpdate::Ignored { key } => key,
        }
    }
}

/// Read-side orchestrator: a view over a view state repository
pub struct MaterializedView<'a, S, E, R> {
    view: View<'a, S, E>,
    repository: R,
    key: KeyFunction<'a, E>,
}

impl<'a, S, E, R> MaterializedView<'a, S, E, R>
where
    S: Clone + Send + Sync,
    E: Tagged + Sync + 'a,
    R: ViewStateRepository<S>,
{
    /// Compose a view with its state repository, keyed by event identity
    pub fn new(view: View<'a, S, E>, repository: R) -> Self
    where
        E: Identifier,
    {
        Self {
            view,
            repository,
            key: Box::new(<E as Identifier>::identifier),
        }
    }

    /// Key view state by a different dimension than the stream id
    pub fn with_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&E) -> String + 'a + Send + Sync,
    {
        self.key = Box::new(key);
        self
    }

    /// The view this materialized view delegates to
    pub fn view(&self) -> &View<'a, S, E> {
        &self.view
    }

    /// Project one delivered event
    ///
    /// Persistence failures are returned so the queue consumer can decide
    /// on redelivery.
    pub async fn handle(&self, event: &StoredEvent<E>) -> InfrastructureResult<ViewUpdate<S>> {
        let key = (self.key)(&event.data);

        if !self.view.handles_event(&event.data) {
            debug!(key = %key, event = event.data.tag(), "Event not projected by this view");
            return Ok(ViewUpdate::Ignored { key });
        }

        let mut record = self
            .repository
            .fetch_state(&key)
            .await?
            .unwrap_or_else(|| ViewRecord::new(self.view.initial_state()));

        if record.has_applied(&event.stream_id, event.version) {
            debug!(
                key = %key,
                stream = %event.stream_id,
                version = event.version,
                "Duplicate delivery skipped"
            );
            return Ok(ViewUpdate::Duplicate {
                key,
                state: record.state,
            });
        }

        record.state = self.view.evolve(&record.state, &event.data);
        record.advance(&event.stream_id, event.version);
        self.repository.save(&key, &record).await?;

        debug!(
            key = %key,
            stream = %event.stream_id,
            version = event.version,
            "View updated"
        );

        Ok(ViewUpdate::Applied {
            key,
            state: record.state,
        })
    }

    /// Current state for `key`, absent when nothing was projected
    pub async fn fetch_state(&self, key: &str) -> InfrastructureResult<Option<S>> {
        Ok(self
            .repository
            .fetch_state(key)
            .await?
            .map(|record| record.state))
    }
}
