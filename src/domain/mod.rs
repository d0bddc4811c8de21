// Copyright (c) 2025 - Cowboy AI, Inc.

//! Restaurant Domain
//!
//! Two independently written deciders share one command enum and one event
//! enum:
//!
//! - [`restaurant`]: restaurants with their menus and order placement
//! - [`order`]: order lifecycle (created → prepared)
//!
//! Each decider registers the variants it owns; the application combines them
//! into one decider over `(Option<Restaurant>, Option<Order>)`.
//!
//! # Domain Rules
//!
//! 1. A restaurant or order can be created only once
//! 2. Menus can change only on existing restaurants
//! 3. An order may only contain items on the restaurant's current menu
//! 4. An order is prepared at most once

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decider::Unroutable;
use crate::message::{Identifier, Tagged};

pub mod order;
pub mod restaurant;

pub use order::{
    order_decider, order_view, CreateOrder, MarkOrderAsPrepared, Order, OrderCreated,
    OrderPrepared, OrderStatus, OrderView,
};
pub use restaurant::{
    restaurant_decider, restaurant_view, ChangeRestaurantMenu, CreateRestaurant, Cuisine,
    MenuItem, PlaceOrder, Restaurant, RestaurantCreated, RestaurantMenu, RestaurantMenuChanged,
    RestaurantOrderPlaced, RestaurantView,
};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Restaurant identity; also the restaurant's stream id
    RestaurantId
);
string_id!(
    /// Order identity; also the order's stream id
    OrderId
);
string_id!(
    /// Menu item identity, unique within a menu
    MenuItemId
);

/// Every command accepted by the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Command {
    /// Open a restaurant with an initial menu
    CreateRestaurant(CreateRestaurant),
    /// Replace a restaurant's menu
    ChangeRestaurantMenu(ChangeRestaurantMenu),
    /// Place an order at a restaurant
    PlaceOrder(PlaceOrder),
    /// Start an order's lifecycle
    CreateOrder(CreateOrder),
    /// Mark an order as prepared
    MarkOrderAsPrepared(MarkOrderAsPrepared),
}

/// Every event the deciders emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    /// A restaurant was opened
    RestaurantCreated(RestaurantCreated),
    /// A restaurant's menu was replaced
    RestaurantMenuChanged(RestaurantMenuChanged),
    /// An order was placed at a restaurant
    RestaurantOrderPlaced(RestaurantOrderPlaced),
    /// An order was created
    OrderCreated(OrderCreated),
    /// An order was prepared
    OrderPrepared(OrderPrepared),
}

impl Tagged for Command {
    fn tag(&self) -> &'static str {
        match self {
            Command::CreateRestaurant(_) => "CreateRestaurant",
            Command::ChangeRestaurantMenu(_) => "ChangeRestaurantMenu",
            Command::PlaceOrder(_) => "PlaceOrder",
            Command::CreateOrder(_) => "CreateOrder",
            Command::MarkOrderAsPrepared(_) => "MarkOrderAsPrepared",
        }
    }
}

impl Identifier for Command {
    fn identifier(&self) -> String {
        match self {
            Command::CreateRestaurant(c) => c.id.to_string(),
            Command::ChangeRestaurantMenu(c) => c.id.to_string(),
            Command::PlaceOrder(c) => c.id.to_string(),
            Command::CreateOrder(c) => c.id.to_string(),
            Command::MarkOrderAsPrepared(c) => c.id.to_string(),
        }
    }
}

impl Tagged for Event {
    fn tag(&self) -> &'static str {
        match self {
            Event::RestaurantCreated(_) => "RestaurantCreated",
            Event::RestaurantMenuChanged(_) => "RestaurantMenuChanged",
            Event::RestaurantOrderPlaced(_) => "RestaurantOrderPlaced",
            Event::OrderCreated(_) => "OrderCreated",
            Event::OrderPrepared(_) => "OrderPrepared",
        }
    }
}

impl Identifier for Event {
    fn identifier(&self) -> String {
        match self {
            Event::RestaurantCreated(e) => e.id.to_string(),
            Event::RestaurantMenuChanged(e) => e.id.to_string(),
            Event::RestaurantOrderPlaced(e) => e.id.to_string(),
            Event::OrderCreated(e) => e.id.to_string(),
            Event::OrderPrepared(e) => e.id.to_string(),
        }
    }
}

/// Business rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Restaurant created twice
    #[error("Restaurant {0} already exists")]
    RestaurantAlreadyExists(RestaurantId),

    /// Command addressed a restaurant with no history
    #[error("Restaurant {0} does not exist")]
    RestaurantNotFound(RestaurantId),

    /// Order referenced an item missing from the menu
    #[error("Order rejected, item not on menu: {item} (restaurant {restaurant})")]
    ItemNotOnMenu {
        /// Restaurant the order was placed at
        restaurant: RestaurantId,
        /// First offending item
        item: MenuItemId,
    },

    /// Order created twice
    #[error("Order {0} already exists")]
    OrderAlreadyExists(OrderId),

    /// Command addressed an order with no history
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),

    /// Order prepared twice
    #[error("Order {0} is already prepared")]
    OrderAlreadyPrepared(OrderId),

    /// No decider owns the command
    #[error(transparent)]
    Unroutable(#[from] Unroutable),
}
