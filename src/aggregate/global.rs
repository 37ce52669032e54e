// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Permissions Aggregate
//!
//! The organization-wide permission map. It exists from the start (empty)
//! and is changed only by global grant and revoke events.

use std::collections::BTreeMap;

use tracing::trace;

use super::{fold_log, Sourced};
use crate::authz::{self, GlobalIntent, Permissions};
use crate::context::Ctx;
use crate::domain::{AggregateKind, ServiceUser};
use crate::errors::{SourcingError, ValidationFailure};
use crate::events::{BusinessEvent, EventHeader};

const KIND: AggregateKind = AggregateKind::GlobalPermissions;

/// Current global permission map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPermissions {
    pub permissions: Permissions<GlobalIntent>,
    pub version: u64,
}

impl GlobalPermissions {
    pub fn permits(&self, user: &ServiceUser, intents: &[GlobalIntent]) -> bool {
        authz::permits(&self.permissions, user, intents)
    }
}

/// Apply a global grant or revoke (pure function)
pub fn apply_event(
    ctx: &Ctx,
    state: &GlobalPermissions,
    event: &BusinessEvent,
) -> Result<GlobalPermissions, ValidationFailure> {
    let event_type = event.event_type();
    trace!(request_id = %ctx.request_id, event_type, "applying event to global permissions");

    let permissions = match event {
        BusinessEvent::GlobalPermissionGranted(e) => {
            if e.grantee.is_empty() {
                return Err(empty_holder());
            }
            state.permissions.granted(e.permission, e.grantee.clone())
        }
        BusinessEvent::GlobalPermissionRevoked(e) => {
            state.permissions.revoked(&e.permission, &e.revokee)
        }
        _ => return Err(ValidationFailure::NotApplicable { event_type, kind: KIND }),
    };

    Ok(GlobalPermissions {
        permissions,
        version: state.version + 1,
    })
}

fn empty_holder() -> ValidationFailure {
    ValidationFailure::InvalidState {
        kind: KIND,
        id: "global".to_string(),
        reason: "permission granted to an empty identity".to_string(),
    }
}

fn is_global(event: &BusinessEvent) -> bool {
    matches!(
        event,
        BusinessEvent::GlobalPermissionGranted(_) | BusinessEvent::GlobalPermissionRevoked(_)
    )
}

/// Replayed global permission map
///
/// Same contract as [`Sourced`]: events that could not be applied are
/// reported in `errors` and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcedGlobal {
    pub state: GlobalPermissions,
    pub errors: Vec<SourcingError>,
}

/// Replay the global grant/revoke events of a log
pub fn source_global_permissions<'a>(
    ctx: &Ctx,
    events: impl IntoIterator<Item = &'a BusinessEvent>,
) -> SourcedGlobal {
    let sourced: Sourced<(), GlobalPermissions> = fold_log(
        events,
        |maps: &mut BTreeMap<(), GlobalPermissions>, event: &BusinessEvent| {
            if !is_global(event) {
                return Ok(());
            }
            let current = maps.entry(()).or_default();
            *current = apply_event(ctx, current, event)?;
            Ok(())
        },
    );

    let Sourced {
        mut aggregates,
        errors,
    } = sourced;
    SourcedGlobal {
        state: aggregates.remove(&()).unwrap_or_default(),
        errors,
    }
}
