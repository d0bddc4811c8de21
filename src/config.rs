// Copyright (c) 2025 - Cowboy AI, Inc.

//! Application configuration
//!
//! Defaults suit tests and the demo binary; every value can be overridden
//! from the environment.

use std::str::FromStr;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::kv::memory::DEFAULT_QUEUE_CAPACITY;

/// Capacity of the ingest queue
pub const QUEUE_CAPACITY_VAR: &str = "RESTAURANT_QUEUE_CAPACITY";
/// Deliveries per queue message before it is dropped
pub const MAX_DELIVERY_ATTEMPTS_VAR: &str = "RESTAURANT_MAX_DELIVERY_ATTEMPTS";
/// Whether appended events are enqueued for projection
pub const PUBLISH_EVENTS_VAR: &str = "RESTAURANT_PUBLISH_EVENTS";

/// Runtime configuration of the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bounded capacity of the ingest queue
    pub queue_capacity: usize,
    /// Deliveries per message before the consumer gives up
    pub max_delivery_attempts: u32,
    /// Enqueue appended events so the views follow the write side
    pub publish_events: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_delivery_attempts: 3,
            publish_events: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source; unset variables keep
    /// their defaults
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let queue_capacity: usize =
            parse_var(&lookup, QUEUE_CAPACITY_VAR)?.unwrap_or(defaults.queue_capacity);
        if queue_capacity == 0 {
            return Err(InfrastructureError::Configuration(format!(
                "{QUEUE_CAPACITY_VAR} must be at least 1"
            )));
        }

        let max_delivery_attempts: u32 = parse_var(&lookup, MAX_DELIVERY_ATTEMPTS_VAR)?
            .unwrap_or(defaults.max_delivery_attempts);
        if max_delivery_attempts == 0 {
            return Err(InfrastructureError::Configuration(format!(
                "{MAX_DELIVERY_ATTEMPTS_VAR} must be at least 1"
            )));
        }

        let publish_events = match lookup(PUBLISH_EVENTS_VAR) {
            Some(raw) => parse_flag(PUBLISH_EVENTS_VAR, &raw)?,
            None => defaults.publish_events,
        };

        Ok(Self {
            queue_capacity,
            max_delivery_attempts,
            publish_events,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> InfrastructureResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e| {
                InfrastructureError::Configuration(format!("{name}={raw:?}: {e}"))
            })
        })
        .transpose()
}

fn parse_flag(name: &str, raw: &str) -> InfrastructureResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(InfrastructureError::Configuration(format!(
            "{name}={raw:?}: expected a boolean"
        ))),
    }
}
