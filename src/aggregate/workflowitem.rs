// Copyright (c) 2025 - Cowboy AI, Inc.
//! Workflow Item Aggregate

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{ensure_open, ensure_target, ensure_well_formed, fold_log, Sourced};
use crate::authz::{self, Permissions, WorkflowitemIntent};
use crate::context::Ctx;
use crate::domain::{
    AggregateKind, Identity, ProjectId, ServiceUser, Status, SubprojectId, WorkflowitemId,
};
use crate::errors::ValidationFailure;
use crate::events::{BusinessEvent, EventHeader, WorkflowitemCreated};

const KIND: AggregateKind = AggregateKind::Workflowitem;

/// Key of a workflow item in a replayed log
pub type WorkflowitemKey = (ProjectId, SubprojectId, WorkflowitemId);

/// Immutable workflow item state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflowitem {
    pub project_id: ProjectId,
    pub subproject_id: SubprojectId,
    pub id: WorkflowitemId,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub display_name: String,
    pub assignee: Option<Identity>,
    pub permissions: Permissions<WorkflowitemIntent>,
    pub version: u64,
}

impl Workflowitem {
    pub fn permits(&self, user: &ServiceUser, intents: &[WorkflowitemIntent]) -> bool {
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
    event: &WorkflowitemCreated,
) -> Result<Workflowitem, ValidationFailure> {
    trace!(
        request_id = %ctx.request_id,
        workflowitem_id = %event.workflowitem.id,
        "creating workflowitem"
    );

    let initial = &event.workflowitem;
    Workflowitem {
        project_id: event.project_id.clone(),
        subproject_id: event.subproject_id.clone(),
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

/// Apply one event to a workflow item (pure function)
pub fn apply_event(
    ctx: &Ctx,
    item: &Workflowitem,
    event: &BusinessEvent,
) -> Result<Workflowitem, ValidationFailure> {
    let event_type = event.event_type();
    trace!(request_id = %ctx.request_id, workflowitem_id = %item.id, event_type, "applying event");

    let next = match event {
        BusinessEvent::WorkflowitemClosed(e) => {
            ensure_target(
                event_type,
                AggregateKind::Project,
                e.project_id.as_str(),
                item.project_id.as_str(),
            )?;
            ensure_target(
                event_type,
                AggregateKind::Subproject,
                e.subproject_id.as_str(),
                item.subproject_id.as_str(),
            )?;
            ensure_target(event_type, KIND, e.workflowitem_id.as_str(), item.id.as_str())?;
            ensure_open(event_type, KIND, item.id.as_str(), item.status)?;
            Workflowitem {
                status: Status::Closed,
                ..item.clone()
            }
        }

        BusinessEvent::WorkflowitemCreated(_) => {
            return Err(ValidationFailure::AlreadyExists {
                kind: KIND,
                id: item.id.to_string(),
            })
        }

        _ => return Err(ValidationFailure::NotApplicable { event_type, kind: KIND }),
    };

    Workflowitem {
        version: item.version + 1,
        ..next
    }
    .validate()
}

fn target_of(event: &BusinessEvent) -> Option<WorkflowitemKey> {
    match event {
        BusinessEvent::WorkflowitemCreated(e) => Some((
            e.project_id.clone(),
            e.subproject_id.clone(),
            e.workflowitem.id.clone(),
        )),
        BusinessEvent::WorkflowitemClosed(e) => Some((
            e.project_id.clone(),
            e.subproject_id.clone(),
            e.workflowitem_id.clone(),
        )),
        _ => None,
    }
}

/// Replay a log into workflow items
pub fn source_workflowitems<'a>(
    ctx: &Ctx,
    events: impl IntoIterator<Item = &'a BusinessEvent>,
) -> Sourced<WorkflowitemKey, Workflowitem> {
    fold_log(events, |items, event| {
        let Some(key) = target_of(event) else {
            return Ok(());
        };

        let next = match (event, items.get(&key)) {
            (BusinessEvent::WorkflowitemCreated(created), None) => create_from_event(ctx, created)?,
            (_, Some(item)) => apply_event(ctx, item, event)?,
            (_, None) => {
                return Err(ValidationFailure::UnknownAggregate {
                    kind: KIND,
                    id: key.2.to_string(),
                })
            }
        };
        items.insert(key, next);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainConfig;
    use crate::events::{InitialWorkflowitemData, WorkflowitemClosed};
    use uuid::Uuid;

    fn test_timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn test_ctx() -> Ctx {
        Ctx::new(&DomainConfig::default(), Uuid::nil(), test_timestamp())
    }

    fn created() -> WorkflowitemCreated {
        WorkflowitemCreated::create_event(
            "http",
            Identity::new("alice"),
            "p-1".into(),
            "s-1".into(),
            InitialWorkflowitemData {
                id: WorkflowitemId::new("w-1"),
                status: Status::Open,
                display_name: "Order pipes".to_string(),
                assignee: Some(Identity::new("bob")),
                permissions: [(WorkflowitemIntent::Close, Identity::new("bob"))]
                    .into_iter()
                    .collect(),
            },
            test_timestamp(),
        )
        .unwrap()
    }

    fn closed(subproject: &str) -> BusinessEvent {
        WorkflowitemClosed::create_event(
            "http",
            Identity::new("bob"),
            "p-1".into(),
            subproject.into(),
            "w-1".into(),
            test_timestamp(),
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_apply_closed() {
        let item = create_from_event(&test_ctx(), &created()).unwrap();

        let next = apply_event(&test_ctx(), &item, &closed("s-1")).unwrap();

        assert!(next.is_closed());
        assert_eq!(next.version, 2);
        assert_eq!(next.assignee, item.assignee);
    }

    #[test]
    fn test_apply_rejects_other_subproject() {
        let item = create_from_event(&test_ctx(), &created()).unwrap();

        let err = apply_event(&test_ctx(), &item, &closed("s-2")).unwrap_err();

        assert!(matches!(
            err,
            ValidationFailure::AggregateMismatch { kind: AggregateKind::Subproject, .. }
        ));
    }

    #[test]
    fn test_source_rejects_close_before_create() {
        let log = vec![closed("s-1"), created().into()];

        let sourced = source_workflowitems(&test_ctx(), &log);

        assert_eq!(sourced.errors.len(), 1);
        assert_eq!(sourced.errors[0].index, 0);
        assert_eq!(sourced.aggregates.len(), 1);
    }
}
