// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subproject Aggregate

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{ensure_open, ensure_target, ensure_well_formed, fold_log, Sourced};
use crate::authz::{self, Permissions, SubprojectIntent};
use crate::context::Ctx;
use crate::domain::{AggregateKind, Identity, ProjectId, ServiceUser, Status, SubprojectId};
use crate::errors::ValidationFailure;
use crate::events::{BusinessEvent, EventHeader, SubprojectCreated};

const KIND: AggregateKind = AggregateKind::Subproject;

/// Immutable subproject state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subproject {
    /// Owning project
    pub project_id: ProjectId,
    pub id: SubprojectId,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub display_name: String,
    pub assignee: Option<Identity>,
    pub permissions: Permissions<SubprojectIntent>,
    pub version: u64,
}

impl Subproject {
    pub fn permits(&self, user: &ServiceUser, intents: &[SubprojectIntent]) -> bool {
        authz::permits(&self.permissions, user, intents)
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    fn validate(self) -> Result<Self, ValidationFailure> {
        ensure_well_formed(
            KIND,
            self.id.as_str(),
            &self.display_name,
            self.assignee.as_ref(),
            self.permissions.iter().flat_map(|(_, holders)| holders),
        )?;
        Ok(self)
    }
}

pub fn create_from_event(
    ctx: &Ctx,
    event: &SubprojectCreated,
) -> Result<Subproject, ValidationFailure> {
    trace!(
        request_id = %ctx.request_id,
        subproject_id = %event.subproject.id,
        "creating subproject"
    );

    let initial = &event.subproject;
    Subproject {
        project_id: event.project_id.clone(),
        id: initial.id.clone(),
        created_at: event.time,
        status: initial.status,
        display_name: initial.display_name.clone(),
        assignee: initial.assignee.clone(),
        permissions: initial.permissions.clone(),
        version: 1,
    }
    .validate()
}

/// Apply one event to a subproject (pure function)
pub fn apply_event(
    ctx: &Ctx,
    subproject: &Subproject,
    event: &BusinessEvent,
) -> Result<Subproject, ValidationFailure> {
    let event_type = event.event_type();
    trace!(
        request_id = %ctx.request_id,
        subproject_id = %subproject.id,
        event_type,
        "applying event"
    );

    let next = match event {
        BusinessEvent::SubprojectClosed(e) => {
            ensure_target(
                event_type,
                AggregateKind::Project,
                e.project_id.as_str(),
                subproject.project_id.as_str(),
            )?;
            ensure_target(event_type, KIND, e.subproject_id.as_str(), subproject.id.as_str())?;
            ensure_open(event_type, KIND, subproject.id.as_str(), subproject.status)?;
            Subproject {
                status: Status::Closed,
                ..subproject.clone()
            }
        }

        BusinessEvent::SubprojectCreated(_) => {
            return Err(ValidationFailure::AlreadyExists {
                kind: KIND,
                id: subproject.id.to_string(),
            })
        }

        _ => return Err(ValidationFailure::NotApplicable { event_type, kind: KIND }),
    };

    Subproject {
        version: subproject.version + 1,
        ..next
    }
    .validate()
}

fn target_of(event: &BusinessEvent) -> Option<(ProjectId, SubprojectId)> {
    match event {
        BusinessEvent::SubprojectCreated(e) => {
            Some((e.project_id.clone(), e.subproject.id.clone()))
        }
        BusinessEvent::SubprojectClosed(e) => Some((e.project_id.clone(), e.subproject_id.clone())),
        _ => None,
    }
}

/// Replay a log into subprojects, keyed by project and subproject id
pub fn source_subprojects<'a>(
    ctx: &Ctx,
    events: impl IntoIterator<Item = &'a BusinessEvent>,
) -> Sourced<(ProjectId, SubprojectId), Subproject> {
    fold_log(events, |subprojects, event| {
        let Some(key) = target_of(event) else {
            return Ok(());
        };

        let next = match (event, subprojects.get(&key)) {
            (BusinessEvent::SubprojectCreated(created), None) => create_from_event(ctx, created)?,
            (_, Some(subproject)) => apply_event(ctx, subproject, event)?,
            (_, None) => {
                return Err(ValidationFailure::UnknownAggregate {
                    kind: KIND,
                    id: key.1.to_string(),
                })
            }
        };
        subprojects.insert(key, next);
        Ok(())
    })
}
