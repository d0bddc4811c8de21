// Copyright (c) 2025 - Cowboy AI, Inc.

//! Order Decider and View
//!
//! ```text
//! CreateOrder         → OrderCreated    (order must not exist)
//! MarkOrderAsPrepared → OrderPrepared   (order must exist and not be prepared)
//! ```

use serde::{Deserialize, Serialize};

use super::{Command, DomainError, Event, MenuItem, OrderId, RestaurantId};
use crate::decider::{Decider, Unroutable};
use crate::view::View;

/// Command tags owned by the order decider
pub const ORDER_COMMANDS: [&str; 2] = ["CreateOrder", "MarkOrderAsPrepared"];

/// Event tags the order decider and view evolve on
pub const ORDER_EVENTS: [&str; 2] = ["OrderCreated", "OrderPrepared"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Prepared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkOrderAsPrepared {
    pub id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPrepared {
    pub id: OrderId,
}

/// Write-side order state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub menu_items: Vec<MenuItem>,
    pub status: OrderStatus,
}

/// Read-side order projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub menu_items: Vec<MenuItem>,
    pub status: OrderStatus,
}

fn decide(command: &Command, state: &Option<Order>) -> Result<Vec<Event>, DomainError> {
    match (command, state) {
        (Command::CreateOrder(cmd), None) => Ok(vec![Event::OrderCreated(OrderCreated {
            id: cmd.id.clone(),
            restaurant_id: cmd.restaurant_id.clone(),
            menu_items: cmd.menu_items.clone(),
        })]),
        (Command::CreateOrder(cmd), Some(_)) => Err(DomainError::OrderAlreadyExists(cmd.id.clone())),
        (Command::MarkOrderAsPrepared(cmd), Some(order)) if order.status == OrderStatus::Prepared => {
            Err(DomainError::OrderAlreadyPrepared(cmd.id.clone()))
        }
        (Command::MarkOrderAsPrepared(cmd), Some(_)) => {
            Ok(vec![Event::OrderPrepared(OrderPrepared { id: cmd.id.clone() })])
        }
        (Command::MarkOrderAsPrepared(cmd), None) => Err(DomainError::OrderNotFound(cmd.id.clone())),
        (other, _) => Err(Unroutable::of(other).into()),
    }
}

fn evolve(state: &Option<Order>, event: &Event) -> Option<Order> {
    match event {
        Event::OrderCreated(e) => Some(Order {
            id: e.id.clone(),
            restaurant_id: e.restaurant_id.clone(),
            menu_items: e.menu_items.clone(),
            status: OrderStatus::Created,
        }),
        Event::OrderPrepared(_) => state.as_ref().map(|order| Order {
            status: OrderStatus::Prepared,
            ..order.clone()
        }),
        _ => state.clone(),
    }
}

/// Decider for the order aggregate
pub fn order_decider<'a>() -> Decider<'a, Command, Option<Order>, Event, DomainError> {
    Decider::new(ORDER_COMMANDS, ORDER_EVENTS, decide, evolve, || None)
}

fn project(state: &Option<OrderView>, event: &Event) -> Option<OrderView> {
    match event {
        // A late OrderCreated never rolls a prepared order back
        Event::OrderCreated(e) => Some(OrderView {
            id: e.id.clone(),
            restaurant_id: e.restaurant_id.clone(),
            menu_items: e.menu_items.clone(),
            status: state
                .as_ref()
                .map(|view| view.status)
                .unwrap_or(OrderStatus::Created),
        }),
        Event::OrderPrepared(_) => state.as_ref().map(|view| OrderView {
            status: OrderStatus::Prepared,
            ..view.clone()
        }),
        _ => state.clone(),
    }
}

/// View of orders and their preparation status
pub fn order_view<'a>() -> View<'a, Option<OrderView>, Event> {
    View::new(ORDER_EVENTS, project, || None)
}
