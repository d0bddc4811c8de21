// Copyright (c) 2025 - Cowboy AI, Inc.

//! Command wire types
//!
//! Commands arrive as a JSON [`CommandEnvelope`] and every outcome leaves as
//! a [`CommandResponse`] tagged by `status`:
//!
//! | status     | cause                                   | code |
//! |------------|-----------------------------------------|------|
//! | `accepted` | events appended                         | 200  |
//! | `rejected` | the decider refused the command         | 422  |
//! | `conflict` | the stream moved since it was read      | 409  |
//! | `failed`   | store or serialization failure          | 500  |
//! | `invalid`  | the envelope could not be parsed        | 400  |

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateError;
use crate::domain::{Command, DomainError, Event};
use crate::event_store::{Appended, CommandMetadata, StoredEvent};

/// A command and the metadata it travels with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: Command,

    /// Generated when the client sends none
    #[serde(default)]
    pub metadata: CommandMetadata,
}

impl CommandEnvelope {
    /// Wrap a command that starts a new flow
    pub fn new(command: Command) -> Self {
        Self {
            command,
            metadata: CommandMetadata::new(),
        }
    }
}

/// Outcome of one submitted command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResponse {
    /// Events were appended at `version`
    Accepted {
        stream_id: String,
        version: u64,
        events: Vec<StoredEvent<Event>>,
    },
    /// A domain rule refused the command
    Rejected {
        stream_id: String,
        reason: String,
    },
    /// The stream moved on since it was read
    Conflict {
        stream_id: String,
        expected: u64,
        actual: u64,
    },
    /// Storage or serialization failed
    Failed {
        stream_id: String,
        reason: String,
    },
    /// The request could not be parsed
    Invalid {
        reason: String,
    },
}

impl CommandResponse {
    /// Classify the aggregate's result for `stream_id`
    pub fn from_result(
        stream_id: String,
        result: Result<Appended<Event>, AggregateError<DomainError>>,
    ) -> Self {
        match result {
            Ok(appended) => CommandResponse::Accepted {
                stream_id,
                version: appended.version,
                events: appended.events,
            },
            Err(AggregateError::Rejected(err)) => CommandResponse::Rejected {
                stream_id,
                reason: err.to_string(),
            },
            Err(AggregateError::Conflict {
                expected, actual, ..
            }) => CommandResponse::Conflict {
                stream_id,
                expected,
                actual,
            },
            Err(AggregateError::Infrastructure(err)) => CommandResponse::Failed {
                stream_id,
                reason: err.to_string(),
            },
        }
    }

    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            CommandResponse::Accepted { .. } => 200,
            CommandResponse::Invalid { .. } => 400,
            CommandResponse::Conflict { .. } => 409,
            CommandResponse::Rejected { .. } => 422,
            CommandResponse::Failed { .. } => 500,
        }
    }

    /// Whether events were appended
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandResponse::Accepted { .. })
    }
}
