// Copyright (c) 2025 - Cowboy AI, Inc.

//! Pure Views
//!
//! A view is the read-side counterpart of a decider: an `evolve` function and
//! an initial state, with no `decide`. Views never reject input; an event
//! whose tag the view does not own leaves its state untouched, because a
//! combined stream interleaves events of several deciders.
//!
//! Views combine the same way deciders do, into a product state:
//!
//! ```text
//! V1 ∘ V2 : evolve((s1, s2), ev) → (V1.evolve(s1, ev), V2.evolve(s2, ev))
//! ```

use std::fmt;
use std::sync::Arc;

use crate::decider::{EvolveFunction, InitialStateFunction, TagSet};
use crate::message::Tagged;

/// Read-side projection of events `E` into state `S`
pub struct View<'a, S, E> {
    events: TagSet,
    evolve: EvolveFunction<'a, S, E>,
    initial_state: InitialStateFunction<'a, S>,
}

impl<'a, S, E> View<'a, S, E>
where
    S: Clone,
    E: Tagged,
{
    /// Create a view owning the given event tags
    pub fn new<V, I>(events: impl Into<TagSet>, evolve: V, initial_state: I) -> Self
    where
        V: Fn(&S, &E) -> S + 'a + Send + Sync,
        I: Fn() -> S + 'a + Send + Sync,
    {
        Self {
            events: events.into(),
            evolve: Box::new(evolve),
            initial_state: Box::new(initial_state),
        }
    }

    /// Event tags this view projects
    pub fn event_tags(&self) -> &TagSet {
        &self.events
    }

    /// Whether `event` changes this view's state
    pub fn handles_event(&self, event: &E) -> bool {
        self.events.contains(event.tag())
    }

    /// Evolve `state` by `event`; unknown events are a no-op
    pub fn evolve(&self, state: &S, event: &E) -> S {
        if !self.handles_event(event) {
            return state.clone();
        }
        (self.evolve)(state, event)
    }

    /// State of a key with no events
    pub fn initial_state(&self) -> S {
        (self.initial_state)()
    }

    /// Fold `events` from the initial state
    pub fn fold<'e, I>(&self, events: I) -> S
    where
        I: IntoIterator<Item = &'e E>,
        E: 'e,
    {
        events
            .into_iter()
            .fold(self.initial_state(), |state, event| self.evolve(&state, event))
    }

    /// Combine with another view over the same event enum
    pub fn combine<S2>(self, other: View<'a, S2, E>) -> View<'a, (S, S2), E>
    where
        S: 'a,
        S2: Clone + 'a,
        E: 'a,
    {
        let events = self.events.union(&other.events);
        let left = Arc::new(self);
        let right = Arc::new(other);

        let evolve = {
            let (left, right) = (Arc::clone(&left), Arc::clone(&right));
            move |state: &(S, S2), event: &E| {
                (left.evolve(&state.0, event), right.evolve(&state.1, event))
            }
        };
        let initial_state = move || (left.initial_state(), right.initial_state());

        View::new(events, evolve, initial_state)
    }
}

impl<S, E> fmt::Debug for View<'_, S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
