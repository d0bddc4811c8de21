// Copyright (c) 2025 - Cowboy AI, Inc.

//! Decider-pattern CQRS for the restaurant domain
//!
//! The write side folds each stream through a pure [`Decider`] and appends
//! the events it decides under optimistic concurrency. Appended events flow
//! through an ingest queue into a [`MaterializedView`], which keeps read
//! models in a view state repository.
//!
//! Deciders and views compose: the application combines independently
//! written restaurant and order deciders into one, routing each command and
//! event by its tag.

pub mod aggregate;
pub mod api;
pub mod application;
pub mod config;
pub mod decider;
pub mod domain;
pub mod errors;
pub mod event_store;
pub mod kv;
pub mod materialized_view;
pub mod message;
pub mod queue;
pub mod view;
pub mod view_store;

// Re-export commonly used types
pub use aggregate::{AggregateError, EventSourcingAggregate};
pub use api::{CommandEnvelope, CommandResponse};
pub use application::Application;
pub use config::AppConfig;
pub use decider::{Decider, TagSet, Unroutable};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use event_store::{Appended, CommandMetadata, EventRepository, KvEventRepository, StoredEvent};
pub use kv::{KvStore, MemoryKv};
pub use materialized_view::{MaterializedView, ViewUpdate};
pub use message::{Identifier, Tagged};
pub use queue::{ConsumerStats, QueueConsumer, QueueHandler};
pub use view::View;
pub use view_store::{KvViewStateRepository, ViewRecord, ViewStateRepository};
