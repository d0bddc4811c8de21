// Copyright (c) 2025 - Cowboy AI, Inc.

//! Restaurant Decider and View
//!
//! ```text
//! CreateRestaurant     → RestaurantCreated       (restaurant must not exist)
//! ChangeRestaurantMenu → RestaurantMenuChanged   (restaurant must exist)
//! PlaceOrder           → RestaurantOrderPlaced   (restaurant must exist, items on menu)
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Command, DomainError, Event, MenuItemId, OrderId, RestaurantId};
use crate::decider::{Decider, Unroutable};
use crate::view::View;

/// Command tags owned by the restaurant decider
pub const RESTAURANT_COMMANDS: [&str; 3] = ["CreateRestaurant", "ChangeRestaurantMenu", "PlaceOrder"];

/// Event tags the restaurant decider and view evolve on
pub const RESTAURANT_EVENTS: [&str; 3] = [
    "RestaurantCreated",
    "RestaurantMenuChanged",
    "RestaurantOrderPlaced",
];

/// Kind of food a menu serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cuisine {
    General,
    Serbian,
    Italian,
    Mexican,
    Chinese,
    Indian,
    French,
}

/// One orderable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    /// Decimal price as text, never rounded through floats
    pub price: String,
}

/// A restaurant's full menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantMenu {
    pub menu_id: Uuid,
    pub items: Vec<MenuItem>,
    pub cuisine: Cuisine,
}

impl RestaurantMenu {
    /// Whether `item` can be ordered from this menu
    pub fn offers(&self, item: &MenuItemId) -> bool {
        self.items.iter().any(|offered| &offered.id == item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRestaurant {
    pub id: RestaurantId,
    pub name: String,
    pub menu: RestaurantMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRestaurantMenu {
    pub id: RestaurantId,
    pub menu: RestaurantMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub id: RestaurantId,
    pub order_id: OrderId,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantCreated {
    pub id: RestaurantId,
    pub name: String,
    pub menu: RestaurantMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantMenuChanged {
    pub id: RestaurantId,
    pub menu: RestaurantMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantOrderPlaced {
    pub id: RestaurantId,
    pub order_id: OrderId,
    pub menu_items: Vec<MenuItem>,
}

/// Write-side restaurant state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub menu: RestaurantMenu,
}

/// Read-side restaurant projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantView {
    pub id: RestaurantId,
    pub name: String,
    pub menu: RestaurantMenu,
    /// Orders placed here; a set, so replaying a placement changes nothing
    pub orders: BTreeSet<OrderId>,
}

fn decide(command: &Command, state: &Option<Restaurant>) -> Result<Vec<Event>, DomainError> {
    match (command, state) {
        (Command::CreateRestaurant(cmd), None) => Ok(vec![Event::RestaurantCreated(
            RestaurantCreated {
                id: cmd.id.clone(),
                name: cmd.name.clone(),
                menu: cmd.menu.clone(),
            },
        )]),
        (Command::CreateRestaurant(cmd), Some(_)) => {
            Err(DomainError::RestaurantAlreadyExists(cmd.id.clone()))
        }
        (Command::ChangeRestaurantMenu(cmd), Some(_)) => Ok(vec![Event::RestaurantMenuChanged(
            RestaurantMenuChanged {
                id: cmd.id.clone(),
                menu: cmd.menu.clone(),
            },
        )]),
        (Command::ChangeRestaurantMenu(cmd), None) => {
            Err(DomainError::RestaurantNotFound(cmd.id.clone()))
        }
        (Command::PlaceOrder(cmd), Some(restaurant)) => {
            if let Some(item) = cmd
                .menu_items
                .iter()
                .find(|item| !restaurant.menu.offers(&item.id))
            {
                return Err(DomainError::ItemNotOnMenu {
                    restaurant: cmd.id.clone(),
                    item: item.id.clone(),
                });
            }
            Ok(vec![Event::RestaurantOrderPlaced(RestaurantOrderPlaced {
                id: cmd.id.clone(),
                order_id: cmd.order_id.clone(),
                menu_items: cmd.menu_items.clone(),
            })])
        }
        (Command::PlaceOrder(cmd), None) => Err(DomainError::RestaurantNotFound(cmd.id.clone())),
        (other, _) => Err(Unroutable::of(other).into()),
    }
}

fn evolve(state: &Option<Restaurant>, event: &Event) -> Option<Restaurant> {
    match event {
        Event::RestaurantCreated(e) => Some(Restaurant {
            id: e.id.clone(),
            name: e.name.clone(),
            menu: e.menu.clone(),
        }),
        Event::RestaurantMenuChanged(e) => state.as_ref().map(|restaurant| Restaurant {
            menu: e.menu.clone(),
            ..restaurant.clone()
        }),
        _ => state.clone(),
    }
}

/// Decider for the restaurant aggregate
pub fn restaurant_decider<'a>() -> Decider<'a, Command, Option<Restaurant>, Event, DomainError> {
    Decider::new(RESTAURANT_COMMANDS, RESTAURANT_EVENTS, decide, evolve, || None)
}

fn project(state: &Option<RestaurantView>, event: &Event) -> Option<RestaurantView> {
    match event {
        Event::RestaurantCreated(e) => Some(RestaurantView {
            id: e.id.clone(),
            name: e.name.clone(),
            menu: e.menu.clone(),
            orders: state
                .as_ref()
                .map(|view| view.orders.clone())
                .unwrap_or_default(),
        }),
        Event::RestaurantMenuChanged(e) => state.as_ref().map(|view| RestaurantView {
            menu: e.menu.clone(),
            ..view.clone()
        }),
        Event::RestaurantOrderPlaced(e) => state.as_ref().map(|view| {
            let mut view = view.clone();
            view.orders.insert(e.order_id.clone());
            view
        }),
        _ => state.clone(),
    }
}

/// View of restaurants and the orders placed with them
pub fn restaurant_view<'a>() -> View<'a, Option<RestaurantView>, Event> {
    View::new(RESTAURANT_EVENTS, project, || None)
}
