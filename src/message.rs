// Copyright (c) 2025 - Cowboy AI, Inc.

//! Message identity
//!
//! Commands and events are plain enums. Two small traits give the engine what
//! it needs to route them without knowing their shape:
//!
//! - [`Tagged`] names the variant. Deciders and views register the tags they
//!   own, and combinators dispatch on tag membership alone.
//! - [`Identifier`] names the stream a command targets or an event belongs
//!   to. The aggregate uses it as the stream id, the materialized view as the
//!   default read-model key.

/// A message that can name its own variant
pub trait Tagged {
    /// Stable name of the variant (e.g. `"CreateRestaurant"`)
    fn tag(&self) -> &'static str;
}

/// A message addressed to one stream
pub trait Identifier {
    /// Stream (aggregate) identity
    fn identifier(&self) -> String;
}
