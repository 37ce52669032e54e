// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the workflow domain
//!
//! Every fallible operation returns one of these through `Result`. Errors wrap
//! their cause with `#[source]` so callers can walk the full chain without the
//! core logging anything itself.

use thiserror::Error;

use crate::domain::{AggregateKind, Identity};

/// Result type for event construction and validation
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for command entry points
pub type CommandResult<T> = Result<T, CommandError>;

/// A single structural rule an event payload broke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    /// The `type` discriminant is missing or names another event
    #[error("expected type {expected:?}, found {found:?}")]
    WrongType {
        expected: &'static str,
        found: Option<String>,
    },

    /// The `type` discriminant names no known event
    #[error("unknown event type {0:?}")]
    UnknownType(String),

    /// A required reference field is empty
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A field is present but its value is unusable
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The payload does not deserialize into the event shape
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Event failed schema validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid {event_type} event")]
pub struct SchemaError {
    pub event_type: String,
    #[source]
    pub violation: SchemaViolation,
}

impl SchemaError {
    pub fn new(event_type: impl Into<String>, violation: SchemaViolation) -> Self {
        Self {
            event_type: event_type.into(),
            violation,
        }
    }
}

/// Reducer rejected an event for the current aggregate state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Event references a different aggregate than the one it is applied to
    #[error("{event_type} targets {kind} {target}, not {actual}")]
    AggregateMismatch {
        event_type: &'static str,
        kind: AggregateKind,
        target: String,
        actual: String,
    },

    /// Event type has no meaning for this aggregate kind
    #[error("{event_type} cannot be applied to a {kind}")]
    NotApplicable {
        event_type: &'static str,
        kind: AggregateKind,
    },

    /// Aggregate is closed and the event would change it
    #[error("{event_type} cannot be applied: {kind} {id} is closed")]
    AlreadyClosed {
        event_type: &'static str,
        kind: AggregateKind,
        id: String,
    },

    /// Creation event for an aggregate that already exists
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: AggregateKind, id: String },

    /// Event references an aggregate missing from the replayed log
    #[error("{kind} {id} does not exist")]
    UnknownAggregate { kind: AggregateKind, id: String },

    /// Resulting state breaks a structural invariant
    #[error("{kind} {id} is invalid: {reason}")]
    InvalidState {
        kind: AggregateKind,
        id: String,
        reason: String,
    },
}

/// An event in a replayed log that could not be folded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event #{index} ({event_type}) could not be applied")]
pub struct SourcingError {
    /// Position of the event in the replayed log
    pub index: usize,
    pub event_type: &'static str,
    #[source]
    pub cause: ValidationFailure,
}

/// Failure reported by a repository port
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Requested aggregate does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: AggregateKind, id: String },

    /// Backing store could not answer
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Variable is set but empty
    #[error("configuration variable {0} must not be empty")]
    Empty(&'static str),
}

/// Coarse error category, used by the transport to pick a response code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    PreconditionFailed,
    NotAuthorized,
    InvalidCommand,
    Schema,
    Internal,
}

/// Command rejected
#[derive(Debug, Error)]
pub enum CommandError {
    /// Target aggregate could not be loaded
    #[error("{kind} {id} not found")]
    NotFound {
        kind: AggregateKind,
        id: String,
        #[source]
        cause: RepositoryError,
    },

    /// State of a related aggregate blocks the transition
    #[error("precondition failed for {event_type}: {message}")]
    Precondition {
        event_type: &'static str,
        message: String,
        #[source]
        cause: Option<RepositoryError>,
    },

    /// Issuer lacks the required intent
    #[error("user {user_id} is not authorized to {intent} on {target}")]
    NotAuthorized {
        user_id: Identity,
        intent: String,
        target: String,
    },

    /// Candidate event failed the reducer dry run
    #[error("invalid command: {event_type} rejected for {kind} {id}")]
    InvalidCommand {
        event_type: &'static str,
        kind: AggregateKind,
        id: String,
        #[source]
        cause: ValidationFailure,
    },

    /// Caller-supplied fields produced a malformed event
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Event construction failed on inputs that were already checked
    #[error("failed to create {event_type} event")]
    EventConstruction {
        event_type: &'static str,
        #[source]
        cause: SchemaError,
    },

    /// Repository read failed outside of a precondition check
    #[error("repository failure")]
    Repository(#[source] RepositoryError),
}

impl CommandError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::NotFound { .. } => ErrorKind::NotFound,
            CommandError::Precondition { .. } => ErrorKind::PreconditionFailed,
            CommandError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            CommandError::InvalidCommand { .. } => ErrorKind::InvalidCommand,
            CommandError::Schema(_) => ErrorKind::Schema,
            CommandError::EventConstruction { .. } | CommandError::Repository(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn not_found(
        kind: AggregateKind,
        id: impl ToString,
        cause: RepositoryError,
    ) -> Self {
        CommandError::NotFound {
            kind,
            id: id.to_string(),
            cause,
        }
    }

    /// Map a failed load of the target aggregate
    ///
    /// A missing aggregate is `NotFound`; any other repository failure is
    /// reported as is.
    pub(crate) fn loading(
        kind: AggregateKind,
        id: impl ToString,
    ) -> impl FnOnce(RepositoryError) -> Self {
        let id = id.to_string();
        move |cause| match cause {
            RepositoryError::NotFound { .. } => Self::not_found(kind, id, cause),
            RepositoryError::Unavailable(_) => CommandError::Repository(cause),
        }
    }

    pub(crate) fn construction(event_type: &'static str) -> impl FnOnce(SchemaError) -> Self {
        move |cause| CommandError::EventConstruction { event_type, cause }
    }

    pub(crate) fn invalid(
        event_type: &'static str,
        kind: AggregateKind,
        id: impl ToString,
    ) -> impl FnOnce(ValidationFailure) -> Self {
        let id = id.to_string();
        move |cause| CommandError::InvalidCommand {
            event_type,
            kind,
            id,
            cause,
        }
    }
}
