// Copyright (c) 2025 - Cowboy AI, Inc.

//! Property-Based Tests for Materialized View Redelivery
//!
//! The ingest queue delivers at least once. Whatever earlier events are
//! delivered again, the stored view states must equal a single delivery.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use restaurant_cqrs::application::{application_view, ApplicationViewState};
use restaurant_cqrs::domain::{
    Event, OrderCreated, OrderPrepared, RestaurantCreated, RestaurantMenu, RestaurantOrderPlaced,
};
use restaurant_cqrs::{
    CommandMetadata, Identifier, KvViewStateRepository, MaterializedView, MemoryKv, StoredEvent,
};

fn sample_events() -> Vec<Event> {
    let menu = RestaurantMenu {
        menu_id: uuid::Uuid::nil(),
        items: vec![],
        cuisine: restaurant_cqrs::domain::Cuisine::Indian,
    };
    let mut events = Vec::new();
    for r in ["r-1", "r-2"] {
        events.push(Event::RestaurantCreated(RestaurantCreated {
            id: r.into(),
            name: r.to_uppercase(),
            menu: menu.clone(),
        }));
    }
    for (r, o) in [("r-1", "o-1"), ("r-2", "o-2"), ("r-1", "o-3")] {
        events.push(Event::RestaurantOrderPlaced(RestaurantOrderPlaced {
            id: r.into(),
            order_id: o.into(),
            menu_items: vec![],
        }));
        events.push(Event::OrderCreated(OrderCreated {
            id: o.into(),
            restaurant_id: r.into(),
            menu_items: vec![],
        }));
        events.push(Event::OrderPrepared(OrderPrepared { id: o.into() }));
    }
    events
}

/// Number each event within its stream, as the event repository would
fn stored(events: &[Event]) -> Vec<StoredEvent<Event>> {
    let metadata = CommandMetadata::new();
    let mut versions: HashMap<String, u64> = HashMap::new();

    events
        .iter()
        .map(|event| {
            let stream = event.identifier();
            let version = versions.entry(stream.clone()).or_default();
            *version += 1;
            StoredEvent::new(stream, *version, &metadata, Utc::now(), event.clone())
        })
        .collect()
}

fn project(deliveries: &[&StoredEvent<Event>]) -> Vec<(String, ApplicationViewState)> {
    tokio_test::block_on(async {
        let kv = Arc::new(MemoryKv::default());
        let repository = KvViewStateRepository::new(Arc::clone(&kv));
        let view = MaterializedView::new(application_view(), repository.clone());

        for event in deliveries {
            view.handle(event).await.expect("in-memory projection");
        }
        repository
            .list_states::<ApplicationViewState>()
            .await
            .expect("in-memory listing")
    })
}

proptest! {
    /// Property: Redelivering earlier events never changes the stored views
    #[test]
    fn prop_redelivery_is_idempotent(
        order in Just(sample_events()).prop_shuffle(),
        replays in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        // Keep per-stream order: the queue is FIFO per producer
        let mut events = order;
        events.sort_by_key(|event| stream_rank(event));
        let stored = stored(&events);

        let once: Vec<&StoredEvent<Event>> = stored.iter().collect();

        let mut with_replays = Vec::new();
        let mut replays = replays.into_iter();
        for (position, event) in stored.iter().enumerate() {
            with_replays.push(event);
            if let Some(index) = replays.next() {
                with_replays.push(&stored[index.index(position + 1)]);
            }
        }

        prop_assert_eq!(project(&with_replays), project(&once));
    }
}

/// Causal rank so a shuffled sample still respects creation before use
fn stream_rank(event: &Event) -> u8 {
    match event {
        Event::RestaurantCreated(_) => 0,
        Event::RestaurantMenuChanged(_) | Event::RestaurantOrderPlaced(_) => 1,
        Event::OrderCreated(_) => 2,
        Event::OrderPrepared(_) => 3,
    }
}

#[test]
fn test_duplicate_of_latest_event_is_skipped() {
    let stored = stored(&sample_events());
    let last = stored.last().expect("sample is not empty");

    let mut deliveries: Vec<&StoredEvent<Event>> = stored.iter().collect();
    let once = project(&deliveries);
    deliveries.push(last);

    assert_eq!(project(&deliveries), once);
}
