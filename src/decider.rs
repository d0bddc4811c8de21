// Copyright (c) 2025 - Cowboy AI, Inc.

//! Pure Functional Deciders
//!
//! A decider is the write-side state machine of one aggregate type, expressed
//! as three pure functions:
//!
//! ```text
//! decide(Command, State) → Result<[Event], Error>
//! evolve(State, Event)   → State
//! initial_state()        → State
//! ```
//!
//! Current state is never stored; it is the fold of the stream through
//! `evolve`, starting from `initial_state`. Anything non-deterministic
//! (time, ids) travels inside the command.
//!
//! # Combination
//!
//! Every decider registers the command and event tags it owns. Two deciders
//! over the same command/event enums combine into one whose state is the
//! product of both:
//!
//! ```text
//! D1 ∘ D2 : decide(cmd, (s1, s2))  → D1.decide(cmd, s1) ++ D2.decide(cmd, s2)   (owners only)
//!           evolve((s1, s2), ev)   → (D1.evolve(s1, ev), D2.evolve(s2, ev))      (owners only)
//! ```
//!
//! Routing depends on tag membership alone, so `(D1 ∘ D2) ∘ D3` and
//! `D1 ∘ (D2 ∘ D3)` decide and evolve identically, up to how the state tuple
//! is nested.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::message::Tagged;

/// Decides which events a command produces given the current state
pub type DecideFunction<'a, C, S, E, Err> =
    Box<dyn Fn(&C, &S) -> Result<Vec<E>, Err> + 'a + Send + Sync>;
/// Evolves state by one event
pub type EvolveFunction<'a, S, E> = Box<dyn Fn(&S, &E) -> S + 'a + Send + Sync>;
/// Produces the state of a stream with no events
pub type InitialStateFunction<'a, S> = Box<dyn Fn() -> S + 'a + Send + Sync>;

/// Set of message tags owned by a decider or view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<&'static str>);

impl TagSet {
    /// Empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Tags owned by either side
    pub fn union(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.union(&other.0).copied().collect())
    }

    /// Tags owned by both sides
    pub fn intersection(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.intersection(&other.0).copied().collect())
    }

    /// Iterate tags in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tag is owned
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<&'static str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'static str>>(iter: I) -> Self {
        TagSet(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[&'static str; N]> for TagSet {
    fn from(tags: [&'static str; N]) -> Self {
        tags.into_iter().collect()
    }
}

/// A command reached a decider that owns none of its handlers
///
/// For a combined decider this means the combination is misconfigured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No decider handles command `{tag}`")]
pub struct Unroutable {
    /// Tag of the rejected command
    pub tag: &'static str,
}

impl Unroutable {
    /// Build from the offending message
    pub fn of<M: Tagged>(message: &M) -> Self {
        Self { tag: message.tag() }
    }
}

/// Write-side state machine over commands `C`, state `S` and events `E`
pub struct Decider<'a, C, S, E, Err> {
    commands: TagSet,
    events: TagSet,
    decide: DecideFunction<'a, C, S, E, Err>,
    evolve: EvolveFunction<'a, S, E>,
    initial_state: InitialStateFunction<'a, S>,
}

impl<'a, C, S, E, Err> Decider<'a, C, S, E, Err>
where
    C: Tagged,
    S: Clone,
    E: Tagged,
    Err: From<Unroutable>,
{
    /// Create a decider owning the given command and event tags
    pub fn new<D, V, I>(
        commands: impl Into<TagSet>,
        events: impl Into<TagSet>,
        decide: D,
        evolve: V,
        initial_state: I,
    ) -> Self
    where
        D: Fn(&C, &S) -> Result<Vec<E>, Err> + 'a + Send + Sync,
        V: Fn(&S, &E) -> S + 'a + Send + Sync,
        I: Fn() -> S + 'a + Send + Sync,
    {
        Self {
            commands: commands.into(),
            events: events.into(),
            decide: Box::new(decide),
            evolve: Box::new(evolve),
            initial_state: Box::new(initial_state),
        }
    }

    /// Command tags routed to this decider
    pub fn command_tags(&self) -> &TagSet {
        &self.commands
    }

    /// Event tags this decider evolves on
    pub fn event_tags(&self) -> &TagSet {
        &self.events
    }

    /// Whether `command` is routed here
    pub fn handles_command(&self, command: &C) -> bool {
        self.commands.contains(command.tag())
    }

    /// Whether `event` changes this decider's state
    pub fn handles_event(&self, event: &E) -> bool {
        self.events.contains(event.tag())
    }

    /// Decide the events `command` produces against `state`
    ///
    /// Commands outside [`Self::command_tags`] fail with [`Unroutable`].
    pub fn decide(&self, command: &C, state: &S) -> Result<Vec<E>, Err> {
        if !self.handles_command(command) {
            return Err(Unroutable::of(command).into());
        }
        (self.decide)(command, state)
    }

    /// Evolve `state` by `event`; events not owned leave it unchanged
    pub fn evolve(&self, state: &S, event: &E) -> S {
        if !self.handles_event(event) {
            return state.clone();
        }
        (self.evolve)(state, event)
    }

    /// State of a stream with no events
    pub fn initial_state(&self) -> S {
        (self.initial_state)()
    }

    /// Fold `events` from the initial state
    pub fn fold<'e, I>(&self, events: I) -> S
    where
        I: IntoIterator<Item = &'e E>,
        E: 'e,
    {
        self.evolve_all(self.initial_state(), events)
    }

    /// Fold `events` on top of an existing state
    pub fn evolve_all<'e, I>(&self, state: S, events: I) -> S
    where
        I: IntoIterator<Item = &'e E>,
        E: 'e,
    {
        events
            .into_iter()
            .fold(state, |state, event| self.evolve(&state, event))
    }

    /// Combine with another decider over the same command and event enums
    ///
    /// The result owns the union of both tag sets and carries the product
    /// state `(S, S2)`. A command owned by both sides is decided by each,
    /// left events first.
    pub fn combine<S2>(self, other: Decider<'a, C, S2, E, Err>) -> Decider<'a, C, (S, S2), E, Err>
    where
        C: 'a,
        S: 'a,
        S2: Clone + 'a,
        E: 'a,
        Err: 'a,
    {
        let commands = self.commands.union(&other.commands);
        let events = self.events.union(&other.events);
        let left = Arc::new(self);
        let right = Arc::new(other);

        let decide = {
            let (left, right) = (Arc::clone(&left), Arc::clone(&right));
            move |command: &C, state: &(S, S2)| -> Result<Vec<E>, Err> {
                let mut events = Vec::new();
                if left.handles_command(command) {
                    events.extend(left.decide(command, &state.0)?);
                }
                if right.handles_command(command) {
                    events.extend(right.decide(command, &state.1)?);
                }
                Ok(events)
            }
        };
        let evolve = {
            let (left, right) = (Arc::clone(&left), Arc::clone(&right));
            move |state: &(S, S2), event: &E| {
                (left.evolve(&state.0, event), right.evolve(&state.1, event))
            }
        };
        let initial_state = move || (left.initial_state(), right.initial_state());

        Decider::new(commands, events, decide, evolve, initial_state)
    }
}

impl<C, S, E, Err> fmt::Debug for Decider<'_, C, S, E, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decider")
            .field("commands", &self.commands)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
