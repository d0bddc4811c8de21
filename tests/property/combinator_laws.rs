// Copyright (c) 2025 - Cowboy AI, Inc.

//! Property-Based Tests for Decider and View Combination
//!
//! Routing is by tag membership only, so combining is associative up to how
//! the product state is nested, and folding is deterministic.

use proptest::prelude::*;
use restaurant_cqrs::application::{application_decider, application_view};
use restaurant_cqrs::domain::{
    Event, MenuItem, OrderCreated, OrderPrepared, RestaurantCreated, RestaurantMenu,
    RestaurantMenuChanged, RestaurantOrderPlaced,
};
use restaurant_cqrs::{Decider, Tagged, Unroutable, View};

// ============================================================================
// Three small deciders over shared enums
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Cmd {
    A(u8),
    B(u8),
    C(u8),
}

#[derive(Debug, Clone, PartialEq)]
enum Evt {
    A(u8),
    B(u8),
    C(u8),
}

impl Tagged for Cmd {
    fn tag(&self) -> &'static str {
        match self {
            Cmd::A(_) => "A",
            Cmd::B(_) => "B",
            Cmd::C(_) => "C",
        }
    }
}

impl Tagged for Evt {
    fn tag(&self) -> &'static str {
        match self {
            Evt::A(_) => "A",
            Evt::B(_) => "B",
            Evt::C(_) => "C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum LawError {
    #[error("zero refused by {0}")]
    Zero(&'static str),
    #[error(transparent)]
    Unroutable(#[from] Unroutable),
}

/// Sums `A` amounts; refuses zero
fn summing<'a>() -> Decider<'a, Cmd, u32, Evt, LawError> {
    Decider::new(
        ["A"],
        ["A"],
        |command: &Cmd, _: &u32| match command {
            Cmd::A(0) => Err(LawError::Zero("summing")),
            Cmd::A(n) => Ok(vec![Evt::A(*n)]),
            other => Err(Unroutable::of(other).into()),
        },
        |state: &u32, event: &Evt| match event {
            Evt::A(n) => state + u32::from(*n),
            _ => *state,
        },
        || 0,
    )
}

/// Counts `B` events
fn counting<'a>() -> Decider<'a, Cmd, usize, Evt, LawError> {
    Decider::new(
        ["B"],
        ["B"],
        |command: &Cmd, _: &usize| match command {
            Cmd::B(n) => Ok(vec![Evt::B(*n)]),
            other => Err(Unroutable::of(other).into()),
        },
        |state: &usize, _: &Evt| state + 1,
        || 0,
    )
}

/// Records `C` amounts; also reacts to `A`, overlapping with [`summing`]
fn recording<'a>() -> Decider<'a, Cmd, Vec<u8>, Evt, LawError> {
    Decider::new(
        ["C", "A"],
        ["C"],
        |command: &Cmd, state: &Vec<u8>| match command {
            Cmd::C(n) | Cmd::A(n) if state.len() < 64 => Ok(vec![Evt::C(*n)]),
            Cmd::C(_) | Cmd::A(_) => Err(LawError::Zero("recording")),
            other => Err(Unroutable::of(other).into()),
        },
        |state: &Vec<u8>, event: &Evt| match event {
            Evt::C(n) => {
                let mut next = state.clone();
                next.push(*n);
                next
            }
            _ => state.clone(),
        },
        Vec::new,
    )
}

fn cmd_strategy() -> impl Strategy<Value = Cmd> {
    prop_oneof![
        any::<u8>().prop_map(Cmd::A),
        any::<u8>().prop_map(Cmd::B),
        any::<u8>().prop_map(Cmd::C),
    ]
}

fn evt_strategy() -> impl Strategy<Value = Evt> {
    prop_oneof![
        any::<u8>().prop_map(Evt::A),
        any::<u8>().prop_map(Evt::B),
        any::<u8>().prop_map(Evt::C),
    ]
}

fn flatten_left<A, B, C>(((a, b), c): ((A, B), C)) -> (A, B, C) {
    (a, b, c)
}

fn flatten_right<A, B, C>((a, (b, c)): (A, (B, C))) -> (A, B, C) {
    (a, b, c)
}

// ============================================================================
// Domain event samples
// ============================================================================

fn domain_events() -> Vec<Event> {
    let menu = RestaurantMenu {
        menu_id: uuid::Uuid::nil(),
        items: vec![MenuItem {
            id: "m-1".into(),
            name: "Soup".into(),
            price: "4.00".into(),
        }],
        cuisine: restaurant_cqrs::domain::Cuisine::General,
    };

    vec![
        Event::RestaurantCreated(RestaurantCreated {
            id: "r-1".into(),
            name: "Corner".into(),
            menu: menu.clone(),
        }),
        Event::RestaurantMenuChanged(RestaurantMenuChanged {
            id: "r-1".into(),
            menu: RestaurantMenu {
                items: vec![],
                ..menu.clone()
            },
        }),
        Event::RestaurantOrderPlaced(RestaurantOrderPlaced {
            id: "r-1".into(),
            order_id: "o-1".into(),
            menu_items: menu.items.clone(),
        }),
        Event::OrderCreated(OrderCreated {
            id: "o-1".into(),
            restaurant_id: "r-1".into(),
            menu_items: menu.items,
        }),
        Event::OrderPrepared(OrderPrepared { id: "o-1".into() }),
    ]
}

fn domain_event_sequence() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(prop::sample::select(domain_events()), 0..30)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: (D1 ∘ D2) ∘ D3 decides like D1 ∘ (D2 ∘ D3)
    #[test]
    fn prop_decide_is_associative(
        history in prop::collection::vec(evt_strategy(), 0..40),
        command in cmd_strategy(),
    ) {
        let left = summing().combine(counting()).combine(recording());
        let right = summing().combine(counting().combine(recording()));

        let left_state = left.fold(&history);
        let right_state = right.fold(&history);

        prop_assert_eq!(
            left.decide(&command, &left_state),
            right.decide(&command, &right_state)
        );
    }

    /// Property: (D1 ∘ D2) ∘ D3 evolves like D1 ∘ (D2 ∘ D3)
    #[test]
    fn prop_evolve_is_associative(history in prop::collection::vec(evt_strategy(), 0..40)) {
        let left = summing().combine(counting()).combine(recording());
        let right = summing().combine(counting().combine(recording()));

        prop_assert_eq!(
            flatten_left(left.fold(&history)),
            flatten_right(right.fold(&history))
        );
    }

    /// Property: Combined views are associative as well
    #[test]
    fn prop_view_combination_is_associative(
        history in prop::collection::vec(evt_strategy(), 0..40),
    ) {
        let sums = || View::new(["A"], |s: &u32, e: &Evt| match e {
            Evt::A(n) => s + u32::from(*n),
            _ => *s,
        }, || 0);
        let counts = || View::new(["B"], |s: &usize, _: &Evt| s + 1, || 0);
        let last = || View::new(["C"], |_: &Option<u8>, e: &Evt| match e {
            Evt::C(n) => Some(*n),
            _ => None,
        }, || None);

        let left = sums().combine(counts()).combine(last());
        let right = sums().combine(counts().combine(last()));

        prop_assert_eq!(
            flatten_left(left.fold(&history)),
            flatten_right(right.fold(&history))
        );
    }

    /// Property: Folding the same history twice yields the same state
    #[test]
    fn prop_fold_is_deterministic(history in domain_event_sequence()) {
        let decider = application_decider();
        prop_assert_eq!(decider.fold(&history), decider.fold(&history));

        let view = application_view();
        prop_assert_eq!(view.fold(&history), view.fold(&history));
    }

    /// Property: A combined decider routes only commands it owns
    #[test]
    fn prop_owned_commands_never_unroutable(command in cmd_strategy()) {
        let combined = summing().combine(counting()).combine(recording());
        let result = combined.decide(&command, &combined.initial_state());
        prop_assert!(!matches!(result, Err(LawError::Unroutable(_))));
    }

    /// Property: A decider alone refuses foreign commands
    #[test]
    fn prop_foreign_commands_unroutable(n in any::<u8>()) {
        let result = counting().decide(&Cmd::A(n), &0);
        prop_assert_eq!(result, Err(LawError::Unroutable(Unroutable { tag: "A" })));
    }
}

#[test]
fn test_overlapping_command_emits_left_events_first() {
    let combined = summing().combine(counting()).combine(recording());
    let events = combined
        .decide(&Cmd::A(7), &combined.initial_state())
        .unwrap();
    assert_eq!(events, vec![Evt::A(7), Evt::C(7)]);
}

#[test]
fn test_rejection_on_either_side_rejects_all() {
    let combined = summing().combine(recording());
    assert_eq!(
        combined.decide(&Cmd::A(0), &combined.initial_state()),
        Err(LawError::Zero("summing"))
    );
}
