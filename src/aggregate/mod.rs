// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Aggregates
//!
//! Aggregates are materialized by folding business events:
//!
//! ```text
//! creation event → create_from_event() → State v1
//! State vN + event → apply_event() → Result<State vN+1, ValidationFailure>
//! ```
//!
//! # Pure Functions
//!
//! 1. **Referential Transparency**: same state and event give the same result
//! 2. **No Side Effects**: no I/O, no clock, no mutation of the input state
//! 3. **Explicit Dependencies**: the request context is passed in, only for tracing
//!
//! # Two Callers
//!
//! The same reducer runs twice in the life of an event:
//!
//! - as a **dry run** inside a command, to prove a candidate event is legal
//!   before it leaves the core
//! - for real when the repository replays the log through the `source_*`
//!   helpers
//!
//! Unlike a pure replay fold, `apply_event` can fail: the dry run relies on it
//! to reject events that do not fit the current state. Replay collects those
//! failures per event instead of aborting, see [`Sourced`].
//!
//! # Closed is terminal
//!
//! There is no reopen event. Once closed, status and assignee never change
//! again; permission grants still apply so access can be audited and adjusted.

pub mod global;
pub mod project;
pub mod subproject;
pub mod workflowitem;

use std::collections::BTreeMap;

use crate::domain::{AggregateKind, Identity, Status};
use crate::errors::{SourcingError, ValidationFailure};
use crate::events::{BusinessEvent, EventHeader};

pub use global::{GlobalPermissions, SourcedGlobal};
pub use project::Project;
pub use subproject::Subproject;
pub use workflowitem::Workflowitem;

/// Result of replaying a log
///
/// Events that could not be applied are reported in `errors` and skipped; the
/// aggregates they targeted keep the state from before the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<K: Ord, A> {
    pub aggregates: BTreeMap<K, A>,
    pub errors: Vec<SourcingError>,
}

impl<K: Ord, A> Default for Sourced<K, A> {
    fn default() -> Self {
        Self {
            aggregates: BTreeMap::new(),
            errors: Vec::new(),
        }
    }
}

/// Fold a log into keyed aggregates
///
/// `step` sees every event in order and decides whether it concerns the
/// aggregate kind being sourced. A failing step is recorded against the event
/// index and the fold carries on.
pub(crate) fn fold_log<'a, K, A, I, F>(events: I, mut step: F) -> Sourced<K, A>
where
    K: Ord,
    I: IntoIterator<Item = &'a BusinessEvent>,
    F: FnMut(&mut BTreeMap<K, A>, &BusinessEvent) -> Result<(), ValidationFailure>,
{
    let mut sourced = Sourced::default();
    for (index, event) in events.into_iter().enumerate() {
        if let Err(cause) = step(&mut sourced.aggregates, event) {
            tracing::debug!(
                index,
                event_type = event.event_type(),
                %cause,
                "skipping event during replay"
            );
            sourced.errors.push(SourcingError {
                index,
                event_type: event.event_type(),
                cause,
            });
        }
    }
    sourced
}

/// Event must reference the aggregate it is applied to
pub(crate) fn ensure_target(
    event_type: &'static str,
    kind: AggregateKind,
    target: &str,
    actual: &str,
) -> Result<(), ValidationFailure> {
    if target != actual {
        return Err(ValidationFailure::AggregateMismatch {
            event_type,
            kind,
            target: target.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Closed aggregates reject events that change status or assignee
pub(crate) fn ensure_open(
    event_type: &'static str,
    kind: AggregateKind,
    id: &str,
    status: Status,
) -> Result<(), ValidationFailure> {
    if status.is_closed() {
        return Err(ValidationFailure::AlreadyClosed {
            event_type,
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Structural checks shared by every hierarchy aggregate
pub(crate) fn ensure_well_formed<'a>(
    kind: AggregateKind,
    id: &str,
    display_name: &str,
    assignee: Option<&Identity>,
    holders: impl IntoIterator<Item = &'a Identity>,
) -> Result<(), ValidationFailure> {
    let invalid = |reason: &str| ValidationFailure::InvalidState {
        kind,
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if display_name.is_empty() {
        return Err(invalid("display name is empty"));
    }
    if assignee.is_some_and(Identity::is_empty) {
        return Err(invalid("assignee is empty"));
    }
    if holders.into_iter().any(Identity::is_empty) {
        return Err(invalid("permission granted to an empty identity"));
    }
    Ok(())
}
