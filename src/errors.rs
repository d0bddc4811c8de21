// Copyright (c) 2025 - Cowboy AI, Inc.

//! Error types for infrastructure operations

use thiserror::Error;

/// Errors raised by the store, the repositories and the ingest queue
///
/// None of these are business rejections; domain errors live with the
/// deciders that produce them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfrastructureError {
    /// Expected stream version did not match the stored one
    #[error("Concurrency conflict on stream `{stream}`: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// Stream the append targeted
        stream: String,
        /// Version the caller folded against
        expected: u64,
        /// Version found in the store
        actual: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Ingest queue is at capacity
    #[error("Ingest queue is full")]
    QueueFull,

    /// Ingest queue no longer accepts messages
    #[error("Ingest queue is closed")]
    QueueClosed,

    /// The single queue listener was already handed out
    #[error("Ingest queue listener already taken")]
    ListenerTaken,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

impl InfrastructureError {
    /// Wrap a decoding failure
    pub fn deserialization(err: impl std::fmt::Display) -> Self {
        InfrastructureError::Deserialization(err.to_string())
    }

    /// True for optimistic concurrency failures
    pub fn is_conflict(&self) -> bool {
        matches!(self, InfrastructureError::ConcurrencyConflict { .. })
    }
}
