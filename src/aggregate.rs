// Copyright (c) 2025 - Cowboy AI, Inc.

//! Event-Sourcing Aggregate
//!
//! The write-side orchestrator. Handling one command is a single optimistic
//! transaction:
//!
//! ```text
//! 1. stream id  ← command.identifier()
//! 2. history    ← repository.fetch(stream id)
//! 3. state      ← fold(initial_state, history)        version ← history length
//! 4. events     ← decide(command, state)              rejection → return, nothing written
//! 5. appended   ← repository.append(stream id, version, events)
//!                                                      conflict → return, caller may retry
//! ```
//!
//! No lock is held between fetch and append. Two commands racing on the same
//! stream both decide against the same version; the store accepts exactly one
//! append and the other gets [`AggregateError::Conflict`]. Retrying is the
//! caller's decision.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decider::{Decider, Unroutable};
use crate::errors::InfrastructureError;
use crate::event_store::{Appended, CommandMetadata, EventRepository};
use crate::message::{Identifier, Tagged};

/// Failure of one command, by cause
#[derive(Debug, Error)]
pub enum AggregateError<Err> {
    /// The decider refused the command
    #[error("Command rejected: {0}")]
    Rejected(Err),

    /// Another command appended to the stream first
    #[error("Concurrency conflict on stream `{stream}`: expected version {expected}, found {actual}")]
    Conflict {
        /// Stream the command targeted
        stream: String,
        /// Version the command was decided against
        expected: u64,
        /// Version found at append time
        actual: u64,
    },

    /// Store or serialization failure
    #[error(transparent)]
    Infrastructure(InfrastructureError),
}

impl<Err> From<InfrastructureError> for AggregateError<Err> {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::ConcurrencyConflict {
                stream,
                expected,
                actual,
            } => AggregateError::Conflict {
                stream,
                expected,
                actual,
            },
            other => AggregateError::Infrastructure(other),
        }
    }
}

/// Write-side orchestrator: a decider over an event repository
pub struct EventSourcingAggregate<'a, C, S, E, Err, R> {
    decider: Decider<'a, C, S, E, Err>,
    repository: R,
}

impl<'a, C, S, E, Err, R> EventSourcingAggregate<'a, C, S, E, Err, R>
where
    C: Tagged + Identifier + Sync,
    S: Clone + Send,
    E: Tagged + Send + Sync,
    Err: From<Unroutable> + std::fmt::Display,
    R: EventRepository<E>,
{
    /// Compose a decider with the repository holding its streams
    pub fn new(decider: Decider<'a, C, S, E, Err>, repository: R) -> Self {
        Self {
            decider,
            repository,
        }
    }

    /// The decider this aggregate delegates to
    pub fn decider(&self) -> &Decider<'a, C, S, E, Err> {
        &self.decider
    }

    /// Handle one command end to end
    ///
    /// Returns the appended events and the new stream version. A command
    /// that decides no events still checks the stream version.
    pub async fn handle(
        &self,
        command: &C,
        metadata: &CommandMetadata,
    ) -> Result<Appended<E>, AggregateError<Err>> {
        let stream_id = command.identifier();
        let (state, version) = self.load(&stream_id).await?;

        let events = match self.decider.decide(command, &state) {
            Ok(events) => events,
            Err(err) => {
                info!(
                    stream = %stream_id,
                    command = command.tag(),
                    reason = %err,
                    "Command rejected"
                );
                return Err(AggregateError::Rejected(err));
            }
        };

        match self
            .repository
            .append(&stream_id, version, events, metadata)
            .await
        {
            Ok(appended) => {
                debug!(
                    stream = %stream_id,
                    command = command.tag(),
                    version = appended.version,
                    "Command handled"
                );
                Ok(appended)
            }
            Err(err) => {
                if err.is_conflict() {
                    warn!(stream = %stream_id, expected = version, "Stale command");
                }
                Err(err.into())
            }
        }
    }

    /// Current state and version of a stream
    pub async fn load(&self, stream_id: &str) -> Result<(S, u64), InfrastructureError> {
        let history = self.repository.fetch(stream_id).await?;
        let version = history.last().map(|stored| stored.version).unwrap_or(0);
        let state = self.decider.fold(history.iter().map(|stored| &stored.data));
        Ok((state, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::KvEventRepository;
    use crate::kv::MemoryKv;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    enum Cmd {
        Open(String),
        Close(String),
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Evt {
        Opened,
        Closed,
    }

    impl Tagged for Cmd {
        fn tag(&self) -> &'static str {
            match self {
                Cmd::Open(_) => "Open",
                Cmd::Close(_) => "Close",
            }
        }
    }

    impl Identifier for Cmd {
        fn identifier(&self) -> String {
            match self {
                Cmd::Open(id) | Cmd::Close(id) => id.clone(),
            }
        }
    }

    impl Tagged for Evt {
        fn tag(&self) -> &'static str {
            match self {
                Evt::Opened => "Opened",
                Evt::Closed => "Closed",
            }
        }
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum DoorError {
        #[error("door already open")]
        AlreadyOpen,
        #[error("door not open")]
        NotOpen,
        #[error(transparent)]
        Unroutable(#[from] Unroutable),
    }

    fn door<'a>() -> Decider<'a, Cmd, Option<bool>, Evt, DoorError> {
        Decider::new(
            ["Open", "Close"],
            ["Opened", "Closed"],
            |command: &Cmd, state: &Option<bool>| match (command, state) {
                (Cmd::Open(_), Some(true)) => Err(DoorError::AlreadyOpen),
                (Cmd::Open(_), _) => Ok(vec![Evt::Opened]),
                (Cmd::Close(_), Some(true)) => Ok(vec![Evt::Closed]),
                (Cmd::Close(_), _) => Err(DoorError::NotOpen),
            },
            |_state: &Option<bool>, event: &Evt| match event {
                Evt::Opened => Some(true),
                Evt::Closed => Some(false),
            },
            || None,
        )
    }

    type DoorAggregate<'a> =
        EventSourcingAggregate<'a, Cmd, Option<bool>, Evt, DoorError, KvEventRepository<MemoryKv>>;

    fn aggregate<'a>() -> DoorAggregate<'a> {
        let kv = Arc::new(MemoryKv::default());
        EventSourcingAggregate::new(door(), KvEventRepository::new(kv, false))
    }

    #[tokio::test]
    async fn test_handle_appends_decided_events() {
        let aggregate = aggregate();
        let metadata = CommandMetadata::new();

        let appended = aggregate.handle(&Cmd::Open("d".into()), &metadata).await.unwrap();
        assert_eq!(appended.version, 1);
        assert_eq!(appended.events[0].data, Evt::Opened);
        assert_eq!(appended.events[0].command_id, metadata.command_id);

        let appended = aggregate.handle(&Cmd::Close("d".into()), &metadata).await.unwrap();
        assert_eq!(appended.version, 2);

        assert_eq!(aggregate.load("d").await.unwrap(), (Some(false), 2));
    }

    #[tokio::test]
    async fn test_rejection_appends_nothing() {
        let aggregate = aggregate();

        let err = aggregate
            .handle(&Cmd::Close("d".into()), &CommandMetadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::Rejected(DoorError::NotOpen)));
        assert_eq!(aggregate.load("d").await.unwrap(), (None, 0));
    }

    #[tokio::test]
    async fn test_streams_are_independent() {
        let aggregate = aggregate();
        let metadata = CommandMetadata::new();

        aggregate.handle(&Cmd::Open("a".into()), &metadata).await.unwrap();
        let appended = aggregate.handle(&Cmd::Open("b".into()), &metadata).await.unwrap();
        assert_eq!(appended.version, 1);
    }

    #[test]
    fn test_conflict_is_lifted_from_infrastructure_error() {
        let err: AggregateError<DoorError> = InfrastructureError::ConcurrencyConflict {
            stream: "d".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(
            err,
            AggregateError::Conflict { expected: 1, actual: 2, .. }
        ));

        let err: AggregateError<DoorError> = InfrastructureError::QueueFull.into();
        assert!(matches!(err, AggregateError::Infrastructure(_)));
    }
}
