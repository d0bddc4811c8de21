// Copyright (c) 2025 - Cowboy AI, Inc.

//! Application Wiring
//!
//! Composes the restaurant and order deciders into one aggregate, the two
//! views into one materialized view, and shares a single store handle
//! between both sides:
//!
//! ```text
//! CommandEnvelope → Application::submit → EventSourcingAggregate → KvEventRepository
//!                                                                        ↓ enqueue
//! Application::restaurant / order ← KvViewStateRepository ← Projector ← QueueConsumer
//! ```
//!
//! Reads are eventually consistent: a query right after an accepted command
//! may not see it until the projector has drained the queue.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::aggregate::EventSourcingAggregate;
use crate::api::{CommandEnvelope, CommandResponse};
use crate::config::AppConfig;
use crate::decider::Decider;
use crate::domain::{
    order_decider, order_view, restaurant_decider, restaurant_view, Command, DomainError, Event,
    Order, OrderId, OrderView, Restaurant, RestaurantId, RestaurantView,
};
use crate::errors::InfrastructureResult;
use crate::event_store::{KvEventRepository, StoredEvent};
use crate::kv::{KvStore, MemoryKv, QueueListener};
use crate::materialized_view::MaterializedView;
use crate::message::{Identifier, Tagged};
use crate::queue::{ConsumerStats, QueueConsumer, QueueHandler};
use crate::view::View;
use crate::view_store::KvViewStateRepository;

/// Write-side state of the combined decider
pub type ApplicationState = (Option<Restaurant>, Option<Order>);

/// Read-side state of the combined view
pub type ApplicationViewState = (Option<RestaurantView>, Option<OrderView>);

/// Restaurant and order deciders combined
pub type ApplicationDecider<'a> = Decider<'a, Command, ApplicationState, Event, DomainError>;

/// Restaurant and order views combined
pub type ApplicationView<'a> = View<'a, ApplicationViewState, Event>;

/// Write side over the event repository
pub type ApplicationAggregate<K> = EventSourcingAggregate<
    'static,
    Command,
    ApplicationState,
    Event,
    DomainError,
    KvEventRepository<K>,
>;

/// Read side over the view state repository
pub type ApplicationMaterializedView<K> =
    MaterializedView<'static, ApplicationViewState, Event, KvViewStateRepository<K>>;

/// Restaurant and order deciders as one
pub fn application_decider<'a>() -> ApplicationDecider<'a> {
    restaurant_decider().combine(order_decider())
}

/// Restaurant and order views as one
pub fn application_view<'a>() -> ApplicationView<'a> {
    restaurant_view().combine(order_view())
}

/// Queue handler folding delivered events into the materialized view
pub struct Projector<K> {
    view: ApplicationMaterializedView<K>,
}

impl<K: KvStore + 'static> Projector<K> {
    /// Projector saving into `repository`
    pub fn new(repository: KvViewStateRepository<K>) -> Self {
        Self {
            view: MaterializedView::new(application_view(), repository),
        }
    }
}

#[async_trait]
impl<K: KvStore + 'static> QueueHandler for Projector<K> {
    async fn handle(&self, payload: Value) -> InfrastructureResult<()> {
        // Undecodable payloads never succeed, so they are not redelivered
        let event: StoredEvent<Event> = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                error!(error = %err, "Discarding undecodable queue message");
                return Ok(());
            }
        };

        let update = self.view.handle(&event).await?;
        info!(
            key = update.key(),
            event = %event.event_type,
            stream = %event.stream_id,
            version = event.version,
            correlation_id = %event.correlation_id,
            "Event handled by view"
        );
        Ok(())
    }
}

/// The restaurant application: command side, projector, and queries
pub struct Application<K> {
    kv: Arc<K>,
    config: AppConfig,
    aggregate: ApplicationAggregate<K>,
    views: KvViewStateRepository<K>,
    projector: Arc<Projector<K>>,
}

impl<K: KvStore + 'static> Application<K> {
    /// Wire both sides over one store handle
    pub fn new(kv: Arc<K>, config: AppConfig) -> Self {
        let events = KvEventRepository::new(Arc::clone(&kv), config.publish_events);
        let views = KvViewStateRepository::new(Arc::clone(&kv));

        Self {
            aggregate: EventSourcingAggregate::new(application_decider(), events),
            projector: Arc::new(Projector::new(views.clone())),
            views,
            kv,
            config,
        }
    }

    /// Shared store handle
    pub fn kv(&self) -> &Arc<K> {
        &self.kv
    }

    /// Configuration the application was built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Write-side aggregate
    pub fn aggregate(&self) -> &ApplicationAggregate<K> {
        &self.aggregate
    }

    /// Handle one command and classify the outcome
    pub async fn submit(&self, envelope: CommandEnvelope) -> CommandResponse {
        let CommandEnvelope { command, metadata } = envelope;
        let stream_id = command.identifier();

        info!(
            command = command.tag(),
            stream = %stream_id,
            command_id = %metadata.command_id,
            correlation_id = %metadata.correlation_id,
            "Handling command"
        );

        let result = self.aggregate.handle(&command, &metadata).await;
        CommandResponse::from_result(stream_id, result)
    }

    /// Parse a JSON envelope and submit it
    pub async fn submit_json(&self, raw: &str) -> CommandResponse {
        match serde_json::from_str::<CommandEnvelope>(raw) {
            Ok(envelope) => self.submit(envelope).await,
            Err(err) => {
                warn!(error = %err, "Malformed command envelope");
                CommandResponse::Invalid {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Run the projector over `listener` on its own task
    pub fn spawn_projector(&self, listener: QueueListener) -> JoinHandle<ConsumerStats> {
        QueueConsumer::new(
            listener,
            Arc::clone(&self.projector),
            self.config.max_delivery_attempts,
        )
        .spawn()
    }

    /// Take the store's queue listener and run the projector on it
    pub async fn start_projector(&self) -> InfrastructureResult<JoinHandle<ConsumerStats>> {
        let listener = self.kv.listen().await?;
        Ok(self.spawn_projector(listener))
    }

    /// Projected restaurant, absent until its creation is projected
    pub async fn restaurant(
        &self,
        id: &RestaurantId,
    ) -> InfrastructureResult<Option<RestaurantView>> {
        Ok(self
            .projector
            .view
            .fetch_state(id.as_str())
            .await?
            .and_then(|(restaurant, _)| restaurant))
    }

    /// Projected order, absent until its creation is projected
    pub async fn order(&self, id: &OrderId) -> InfrastructureResult<Option<OrderView>> {
        Ok(self
            .projector
            .view
            .fetch_state(id.as_str())
            .await?
            .and_then(|(_, order)| order))
    }

    /// Every projected restaurant, by id
    pub async fn restaurants(&self) -> InfrastructureResult<Vec<RestaurantView>> {
        Ok(self
            .views
            .list_states::<ApplicationViewState>()
            .await?
            .into_iter()
            .filter_map(|(_, (restaurant, _))| restaurant)
            .collect())
    }

    /// Every projected order, by id
    pub async fn orders(&self) -> InfrastructureResult<Vec<OrderView>> {
        Ok(self
            .views
            .list_states::<ApplicationViewState>()
            .await?
            .into_iter()
            .filter_map(|(_, (_, order))| order)
            .collect())
    }
}

impl Application<MemoryKv> {
    /// Application over a fresh in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        let kv = Arc::new(MemoryKv::new(config.queue_capacity));
        Self::new(kv, config)
    }

    /// Close the ingest queue so the projector drains and stops
    pub async fn shutdown(&self) {
        self.kv.close_queue().await;
    }
}
