// Copyright (c) 2025 - Cowboy AI, Inc.
//! Project Aggregate
//!
//! ```text
//! project_created → Project v1
//!                     ├─ project_assigned            (open only)
//!                     ├─ project_permission_granted
//!                     ├─ project_permission_revoked
//!                     └─ project_closed              (open only, terminal)
//! ```

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{ensure_open, ensure_target, ensure_well_formed, fold_log, Sourced};
use crate::authz::{self, Permissions, ProjectIntent};
use crate::context::Ctx;
use crate::domain::{AggregateKind, Identity, ProjectId, ServiceUser, Status};
use crate::errors::ValidationFailure;
use crate::events::{BusinessEvent, EventHeader, ProjectCreated};

const KIND: AggregateKind = AggregateKind::Project;

/// Immutable project state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,

    /// Time of the creation event
    pub created_at: DateTime<Utc>,

    pub status: Status,
    pub display_name: String,
    pub description: String,
    pub assignee: Option<Identity>,
    pub permissions: Permissions<ProjectIntent>,

    /// Number of events applied, creation included
    pub version: u64,
}

impl Project {
    /// Whether the user holds one of the intents on this project
    pub fn permits(&self, user: &ServiceUser, intents: &[ProjectIntent]) -> bool {
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

/// Materialize a project from its creation event
pub fn create_from_event(ctx: &Ctx, event: &ProjectCreated) -> Result<Project, ValidationFailure> {
    trace!(request_id = %ctx.request_id, project_id = %event.project.id, "creating project");

    let initial = &event.project;
    Project {
        id: initial.id.clone(),
        created_at: event.time,
        status: initial.status,
        display_name: initial.display_name.clone(),
        description: initial.description.clone(),
        assignee: initial.assignee.clone(),
        permissions: initial.permissions.clone(),
        version: 1,
    }
    .validate()
}

/// Apply one event to a project (pure function)
///
/// Returns the next state, or the rule the event breaks. The input state is
/// never touched, so a failed dry run leaves nothing behind.
pub fn apply_event(
    ctx: &Ctx,
    project: &Project,
    event: &BusinessEvent,
) -> Result<Project, ValidationFailure> {
    let event_type = event.event_type();
    trace!(request_id = %ctx.request_id, project_id = %project.id, event_type, "applying event");

    let next = match event {
        BusinessEvent::ProjectAssigned(e) => {
            ensure_target(event_type, KIND, e.project_id.as_str(), project.id.as_str())?;
            ensure_open(event_type, KIND, project.id.as_str(), project.status)?;
            Project {
                assignee: Some(e.assignee.clone()),
                ..project.clone()
            }
        }

        BusinessEvent::ProjectPermissionGranted(e) => {
            ensure_target(event_type, KIND, e.project_id.as_str(), project.id.as_str())?;
            Project {
                permissions: project.permissions.granted(e.permission, e.grantee.clone()),
                ..project.clone()
            }
        }

        BusinessEvent::ProjectPermissionRevoked(e) => {
            ensure_target(event_type, KIND, e.project_id.as_str(), project.id.as_str())?;
            Project {
                permissions: project.permissions.revoked(&e.permission, &e.revokee),
                ..project.clone()
            }
        }

        BusinessEvent::ProjectClosed(e) => {
            ensure_target(event_type, KIND, e.project_id.as_str(), project.id.as_str())?;
            ensure_open(event_type, KIND, project.id.as_str(), project.status)?;
            Project {
                status: Status::Closed,
                ..project.clone()
            }
        }

        BusinessEvent::ProjectCreated(_) => {
            return Err(ValidationFailure::AlreadyExists {
                kind: KIND,
                id: project.id.to_string(),
            })
        }

        _ => return Err(ValidationFailure::NotApplicable { event_type, kind: KIND }),
    };

    Project {
        version: project.version + 1,
        ..next
    }
    .validate()
}

/// Project an event applies to, if any
fn target_of(event: &BusinessEvent) -> Option<&ProjectId> {
    match event {
        BusinessEvent::ProjectCreated(e) => Some(&e.project.id),
        BusinessEvent::ProjectAssigned(e) => Some(&e.project_id),
        BusinessEvent::ProjectPermissionGranted(e) => Some(&e.project_id),
        BusinessEvent::ProjectPermissionRevoked(e) => Some(&e.project_id),
        BusinessEvent::ProjectClosed(e) => Some(&e.project_id),
        _ => None,
    }
}

/// Replay a log into the projects it describes
///
/// Events about other aggregate kinds are ignored.
pub fn source_projects<'a>(
    ctx: &Ctx,
    events: impl IntoIterator<Item = &'a BusinessEvent>,
) -> Sourced<ProjectId, Project> {
    fold_log(events, |projects, event| {
        let Some(id) = target_of(event) else {
            return Ok(());
        };

        let next = match (event, projects.get(id)) {
            (BusinessEvent::ProjectCreated(created), None) => create_from_event(ctx, created)?,
            (_, Some(project)) => apply_event(ctx, project, event)?,
            (_, None) => {
                return Err(ValidationFailure::UnknownAggregate {
                    kind: KIND,
                    id: id.to_string(),
                })
            }
        };
        projects.insert(id.clone(), next);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainConfig;
    use crate::events::{
        InitialProjectData, ProjectAssigned, ProjectClosed, ProjectPermissionGranted,
        ProjectPermissionRevoked, SubprojectClosed,
    };
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn test_timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn test_ctx() -> Ctx {
        Ctx::new(&DomainConfig::default(), Uuid::nil(), test_timestamp())
    }

    fn created(id: &str) -> ProjectCreated {
        ProjectCreated::create_event(
            "http",
            Identity::new("root"),
            InitialProjectData {
                id: ProjectId::new(id),
                status: Status::Open,
                display_name: "Road works".to_string(),
                description: "Resurface the ring road".to_string(),
                assignee: Some(Identity::new("alice")),
                permissions: [(ProjectIntent::Close, Identity::new("alice"))]
                    .into_iter()
                    .collect(),
            },
            test_timestamp(),
        )
        .unwrap()
    }

    fn closed(id: &str) -> BusinessEvent {
        ProjectClosed::create_event(
            "http",
            Identity::new("alice"),
            ProjectId::new(id),
            test_timestamp(),
        )
        .unwrap()
        .into()
    }

    fn open_project() -> Project {
        create_from_event(&test_ctx(), &created("p-1")).unwrap()
    }

    #[test]
    fn test_create_from_event() {
        // Act
        let project = open_project();

        // Assert
        assert_eq!(project.id.as_str(), "p-1");
        assert_eq!(project.status, Status::Open);
        assert_eq!(project.created_at, test_timestamp());
        assert_eq!(project.version, 1);
        assert!(project.permits(&ServiceUser::new("alice"), &[ProjectIntent::Close]));
    }

    #[test]
    fn test_apply_project_closed() {
        // Arrange
        let project = open_project();

        // Act
        let next = apply_event(&test_ctx(), &project, &closed("p-1")).unwrap();

        // Assert
        assert!(next.is_closed());
        assert_eq!(next.version, 2);
        // Input state untouched
        assert_eq!(project.status, Status::Open);
    }

    #[test]
    fn test_apply_rejects_second_close() {
        let project = apply_event(&test_ctx(), &open_project(), &closed("p-1")).unwrap();

        let err = apply_event(&test_ctx(), &project, &closed("p-1")).unwrap_err();

        assert!(matches!(err, ValidationFailure::AlreadyClosed { .. }));
    }

    #[test]
    fn test_apply_rejects_other_project() {
        let err = apply_event(&test_ctx(), &open_project(), &closed("p-2")).unwrap_err();

        assert!(matches!(err, ValidationFailure::AggregateMismatch { .. }));
    }

    #[test]
    fn test_apply_rejects_foreign_event_type() {
        let event: BusinessEvent = SubprojectClosed::create_event(
            "http",
            Identity::new("alice"),
            "p-1".into(),
            "s-1".into(),
            test_timestamp(),
        )
        .unwrap()
        .into();

        let err = apply_event(&test_ctx(), &open_project(), &event).unwrap_err();

        assert_eq!(
            err,
            ValidationFailure::NotApplicable {
                event_type: "subproject_closed",
                kind: AggregateKind::Project,
            }
        );
    }

    #[test]
    fn test_assign_after_close_is_rejected() {
        let project = apply_event(&test_ctx(), &open_project(), &closed("p-1")).unwrap();
        let assigned: BusinessEvent = ProjectAssigned::create_event(
            "http",
            Identity::new("root"),
            "p-1".into(),
            Identity::new("bob"),
            test_timestamp(),
        )
        .unwrap()
        .into();

        assert!(apply_event(&test_ctx(), &project, &assigned).is_err());
    }

    #[test]
    fn test_permissions_change_after_close() {
        let project = apply_event(&test_ctx(), &open_project(), &closed("p-1")).unwrap();
        let revoked: BusinessEvent = ProjectPermissionRevoked::create_event(
            "http",
            Identity::new("root"),
            "p-1".into(),
            ProjectIntent::Close,
            Identity::new("alice"),
            test_timestamp(),
        )
        .unwrap()
        .into();

        let next = apply_event(&test_ctx(), &project, &revoked).unwrap();

        assert!(!next.permits(&ServiceUser::new("alice"), &[ProjectIntent::Close]));
    }

    #[test]
    fn test_source_projects_collects_failures() {
        // Arrange
        let granted: BusinessEvent = ProjectPermissionGranted::create_event(
            "http",
            Identity::new("root"),
            "p-1".into(),
            ProjectIntent::Assign,
            Identity::new("managers"),
            test_timestamp(),
        )
        .unwrap()
        .into();
        let log = vec![
            closed("p-9"),
            created("p-1").into(),
            granted,
            closed("p-1"),
            closed("p-1"),
        ];

        // Act
        let sourced = source_projects(&test_ctx(), &log);

        // Assert
        let project = &sourced.aggregates[&ProjectId::new("p-1")];
        assert!(project.is_closed());
        assert_eq!(project.version, 3);
        assert!(project.permits(
            &ServiceUser::new("bob").with_groups(["managers"]),
            &[ProjectIntent::Assign]
        ));
        let failed: Vec<usize> = sourced.errors.iter().map(|e| e.index).collect();
        assert_eq!(failed, vec![0, 4]);
        assert!(matches!(
            sourced.errors[0].cause,
            ValidationFailure::UnknownAggregate { .. }
        ));
    }

    #[test]
    fn test_source_is_deterministic() {
        let log: Vec<BusinessEvent> =
            vec![created("p-1").into(), created("p-2").into(), closed("p-2")];

        assert_eq!(
            source_projects(&test_ctx(), &log),
            source_projects(&test_ctx(), &log)
        );
    }
}
