// Copyright (c) 2025 - Cowboy AI, Inc.

//! Test Fixtures for restaurant-cqrs
//!
//! Deterministic commands and metadata shared by the integration tests.
//! All UUIDs are fixed constants so failures are reproducible.

#![allow(dead_code)]

use uuid::Uuid;

use restaurant_cqrs::domain::{
    ChangeRestaurantMenu, Command, CreateOrder, CreateRestaurant, Cuisine, MarkOrderAsPrepared,
    MenuItem, PlaceOrder, RestaurantMenu,
};
use restaurant_cqrs::{CommandEnvelope, CommandMetadata};

pub const RESTAURANT_ID: &str = "restaurant-1";
pub const ORDER_ID: &str = "order-1";

pub const MENU_ID_1: &str = "01934f4a-3000-7000-8000-000000003000";
pub const COMMAND_ID_1: &str = "01934f4a-a001-7000-8000-00000000a001";
pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_metadata() -> CommandMetadata {
    CommandMetadata {
        command_id: parse_uuid(COMMAND_ID_1),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

pub fn menu_item(id: &str) -> MenuItem {
    MenuItem {
        id: id.into(),
        name: format!("Item {id}"),
        price: "12.50".into(),
    }
}

pub fn menu(items: &[&str]) -> RestaurantMenu {
    RestaurantMenu {
        menu_id: parse_uuid(MENU_ID_1),
        items: items.iter().map(|id| menu_item(id)).collect(),
        cuisine: Cuisine::Serbian,
    }
}

pub fn create_restaurant(items: &[&str]) -> Command {
    Command::CreateRestaurant(CreateRestaurant {
        id: RESTAURANT_ID.into(),
        name: "Kafana".into(),
        menu: menu(items),
    })
}

pub fn change_menu(items: &[&str]) -> Command {
    Command::ChangeRestaurantMenu(ChangeRestaurantMenu {
        id: RESTAURANT_ID.into(),
        menu: menu(items),
    })
}

pub fn place_order(order_id: &str, items: &[&str]) -> Command {
    Command::PlaceOrder(PlaceOrder {
        id: RESTAURANT_ID.into(),
        order_id: order_id.into(),
        menu_items: items.iter().map(|id| menu_item(id)).collect(),
    })
}

pub fn create_order(order_id: &str, items: &[&str]) -> Command {
    Command::CreateOrder(CreateOrder {
        id: order_id.into(),
        restaurant_id: RESTAURANT_ID.into(),
        menu_items: items.iter().map(|id| menu_item(id)).collect(),
    })
}

pub fn mark_prepared(order_id: &str) -> Command {
    Command::MarkOrderAsPrepared(MarkOrderAsPrepared {
        id: order_id.into(),
    })
}

pub fn envelope(command: Command) -> CommandEnvelope {
    CommandEnvelope {
        command,
        metadata: fixed_metadata(),
    }
}
