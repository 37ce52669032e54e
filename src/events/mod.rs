// Copyright (c) 2025 - Cowboy AI, Inc.
//! Business Events
//!
//! Every state change in the workflow domain is an immutable business event.
//! Events are appended to a log and never modified afterwards.
//!
//! # Wire Form
//!
//! ```json
//! {
//!   "type": "project_closed",
//!   "source": "http",
//!   "time": "2026-01-19T12:00:00Z",
//!   "publisher": "alice",
//!   "project_id": "p-1"
//! }
//! ```
//!
//! Unknown fields are dropped when a payload is read, so older readers keep
//! working when a newer writer adds fields.
//!
//! # Construction
//!
//! Every event type follows the same two steps: build the candidate, then run
//! it through [`EventSchema::validated`]. Nothing hands out an event that did
//! not pass its schema.
//!
//! ```rust,ignore
//! let event = ProjectClosed::create_event(&ctx.source, issuer.id.clone(), project_id, ctx.time)?;
//! ```
//!
//! # Module Organization
//!
//! - [`global_permission`] - organization-wide grant/revoke audit records
//! - [`project`] - project lifecycle, assignment and permissions
//! - [`subproject`] - subproject lifecycle
//! - [`workflowitem`] - workflow item lifecycle
//! - [`notification`] - derived notifications
//! - [`time`] - ISO 8601 timestamp handling

/// Implements [`EventHeader`] and the conversion into [`BusinessEvent`]
macro_rules! business_event {
    ($name:ident) => {
        impl $crate::events::EventHeader for $name {
            fn event_type(&self) -> &'static str {
                <Self as $crate::events::EventSchema>::TYPE
            }

            fn source(&self) -> &str {
                &self.source
            }

            fn time(&self) -> chrono::DateTime<chrono::Utc> {
                self.time
            }
        }

        impl From<$name> for $crate::events::BusinessEvent {
            fn from(event: $name) -> Self {
                $crate::events::BusinessEvent::$name(event)
            }
        }
    };
}

pub mod global_permission;
pub mod notification;
pub mod project;
pub mod subproject;
pub mod time;
pub mod workflowitem;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::authz::{Intent, Permissions};
use crate::domain::Identity;
use crate::errors::{SchemaError, SchemaResult, SchemaViolation};

pub use global_permission::{GlobalPermissionGranted, GlobalPermissionRevoked};
pub use notification::{NotificationCreated, NotificationSubject};
pub use project::{
    InitialProjectData, ProjectAssigned, ProjectClosed, ProjectCreated,
    ProjectPermissionGranted, ProjectPermissionRevoked,
};
pub use subproject::{InitialSubprojectData, SubprojectClosed, SubprojectCreated};
pub use workflowitem::{InitialWorkflowitemData, WorkflowitemClosed, WorkflowitemCreated};

/// Fields every event carries, readable without knowing its type
pub trait EventHeader {
    /// The `type` discriminant
    fn event_type(&self) -> &'static str;

    /// Free-text provenance, may be empty
    fn source(&self) -> &str;

    fn time(&self) -> DateTime<Utc>;
}

/// Structural schema of one event type
pub trait EventSchema: EventHeader + Sized + Serialize + DeserializeOwned + Into<BusinessEvent> {
    /// The `type` discriminant of this event
    const TYPE: &'static str;

    /// Check the rules serde cannot express (non-empty references, ...)
    fn check(&self) -> Result<(), SchemaViolation>;

    /// Accept a candidate only if it passes [`check`](Self::check)
    fn validated(candidate: Self) -> SchemaResult<Self> {
        candidate
            .check()
            .map_err(|violation| SchemaError::new(Self::TYPE, violation))?;
        Ok(candidate)
    }

    /// Validate a raw payload as this event type
    ///
    /// The discriminant must match, `time` must parse as ISO 8601, intents
    /// must belong to the right enumeration and unknown fields are stripped.
    fn validate(input: Value) -> SchemaResult<Self> {
        let found = input.get("type").and_then(Value::as_str);
        if found != Some(Self::TYPE) {
            return Err(SchemaError::new(
                Self::TYPE,
                SchemaViolation::WrongType {
                    expected: Self::TYPE,
                    found: found.map(str::to_owned),
                },
            ));
        }

        let candidate: Self = serde_json::from_value(input).map_err(|err| {
            SchemaError::new(Self::TYPE, SchemaViolation::Malformed(err.to_string()))
        })?;
        Self::validated(candidate)
    }
}

/// All business events, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusinessEvent {
    GlobalPermissionGranted(GlobalPermissionGranted),
    GlobalPermissionRevoked(GlobalPermissionRevoked),
    ProjectCreated(ProjectCreated),
    ProjectAssigned(ProjectAssigned),
    ProjectPermissionGranted(ProjectPermissionGranted),
    ProjectPermissionRevoked(ProjectPermissionRevoked),
    ProjectClosed(ProjectClosed),
    SubprojectCreated(SubprojectCreated),
    SubprojectClosed(SubprojectClosed),
    WorkflowitemCreated(WorkflowitemCreated),
    WorkflowitemClosed(WorkflowitemClosed),
    NotificationCreated(NotificationCreated),
}

impl BusinessEvent {
    /// Validate a raw payload of any event type
    pub fn validate(input: Value) -> SchemaResult<Self> {
        let Some(event_type) = input.get("type").and_then(Value::as_str).map(str::to_owned) else {
            return Err(SchemaError::new(
                "business",
                SchemaViolation::WrongType {
                    expected: "business event",
                    found: None,
                },
            ));
        };

        match event_type.as_str() {
            GlobalPermissionGranted::TYPE => {
                GlobalPermissionGranted::validate(input).map(Into::into)
            }
            GlobalPermissionRevoked::TYPE => {
                GlobalPermissionRevoked::validate(input).map(Into::into)
            }
            ProjectCreated::TYPE => ProjectCreated::validate(input).map(Into::into),
            ProjectAssigned::TYPE => ProjectAssigned::validate(input).map(Into::into),
            ProjectPermissionGranted::TYPE => {
                ProjectPermissionGranted::validate(input).map(Into::into)
            }
            ProjectPermissionRevoked::TYPE => {
                ProjectPermissionRevoked::validate(input).map(Into::into)
            }
            ProjectClosed::TYPE => ProjectClosed::validate(input).map(Into::into),
            SubprojectCreated::TYPE => SubprojectCreated::validate(input).map(Into::into),
            SubprojectClosed::TYPE => SubprojectClosed::validate(input).map(Into::into),
            WorkflowitemCreated::TYPE => WorkflowitemCreated::validate(input).map(Into::into),
            WorkflowitemClosed::TYPE => WorkflowitemClosed::validate(input).map(Into::into),
            NotificationCreated::TYPE => NotificationCreated::validate(input).map(Into::into),
            unknown => Err(SchemaError::new(
                unknown,
                SchemaViolation::UnknownType(unknown.to_string()),
            )),
        }
    }

    /// Re-run the schema check of the wrapped event
    pub fn check(&self) -> SchemaResult<()> {
        fn run<E: EventSchema>(event: &E) -> SchemaResult<()> {
            event
                .check()
                .map_err(|violation| SchemaError::new(E::TYPE, violation))
        }

        match self {
            BusinessEvent::GlobalPermissionGranted(e) => run(e),
            BusinessEvent::GlobalPermissionRevoked(e) => run(e),
            BusinessEvent::ProjectCreated(e) => run(e),
            BusinessEvent::ProjectAssigned(e) => run(e),
            BusinessEvent::ProjectPermissionGranted(e) => run(e),
            BusinessEvent::ProjectPermissionRevoked(e) => run(e),
            BusinessEvent::ProjectClosed(e) => run(e),
            BusinessEvent::SubprojectCreated(e) => run(e),
            BusinessEvent::SubprojectClosed(e) => run(e),
            BusinessEvent::WorkflowitemCreated(e) => run(e),
            BusinessEvent::WorkflowitemClosed(e) => run(e),
            BusinessEvent::NotificationCreated(e) => run(e),
        }
    }

    fn header(&self) -> &dyn EventHeader {
        match self {
            BusinessEvent::GlobalPermissionGranted(e) => e,
            BusinessEvent::GlobalPermissionRevoked(e) => e,
            BusinessEvent::ProjectCreated(e) => e,
            BusinessEvent::ProjectAssigned(e) => e,
            BusinessEvent::ProjectPermissionGranted(e) => e,
            BusinessEvent::ProjectPermissionRevoked(e) => e,
            BusinessEvent::ProjectClosed(e) => e,
            BusinessEvent::SubprojectCreated(e) => e,
            BusinessEvent::SubprojectClosed(e) => e,
            BusinessEvent::WorkflowitemCreated(e) => e,
            BusinessEvent::WorkflowitemClosed(e) => e,
            BusinessEvent::NotificationCreated(e) => e,
        }
    }
}

impl EventHeader for BusinessEvent {
    fn event_type(&self) -> &'static str {
        self.header().event_type()
    }

    fn source(&self) -> &str {
        self.header().source()
    }

    fn time(&self) -> DateTime<Utc> {
        self.header().time()
    }
}

pub(crate) fn require_identity(
    field: &'static str,
    identity: &Identity,
) -> Result<(), SchemaViolation> {
    require_non_empty(field, identity.as_str())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), SchemaViolation> {
    if value.is_empty() {
        return Err(SchemaViolation::EmptyField(field));
    }
    Ok(())
}

/// Every holder in an initial permission map must be a real identity
pub(crate) fn require_holders<I: Intent>(
    field: &'static str,
    permissions: &Permissions<I>,
) -> Result<(), SchemaViolation> {
    for (intent, holders) in permissions.iter() {
        if holders.iter().any(Identity::is_empty) {
            return Err(SchemaViolation::InvalidField {
                field,
                reason: format!("empty identity listed under {intent}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::GlobalIntent;
    use serde_json::json;

    fn test_timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_union_dispatches_on_type() {
        let payload = json!({
            "type": "global_permission_revoked",
            "source": "",
            "time": "2026-01-19T12:00:00Z",
            "publisher": "root",
            "permission": "global.createProject",
            "revokee": "alice",
        });

        let event = BusinessEvent::validate(payload).unwrap();

        assert_eq!(event.event_type(), "global_permission_revoked");
        assert_eq!(event.source(), "");
        assert_eq!(event.time(), test_timestamp());
        match event {
            BusinessEvent::GlobalPermissionRevoked(e) => {
                assert_eq!(e.permission, GlobalIntent::CreateProject);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_union_rejects_unknown_type() {
        let err = BusinessEvent::validate(json!({"type": "project_reopened"})).unwrap_err();

        assert_eq!(err.event_type, "project_reopened");
        assert_eq!(
            err.violation,
            SchemaViolation::UnknownType("project_reopened".to_string())
        );
    }

    #[test]
    fn test_union_rejects_missing_type() {
        let err = BusinessEvent::validate(json!({"source": "http"})).unwrap_err();

        assert!(matches!(err.violation, SchemaViolation::WrongType { found: None, .. }));
    }

    #[test]
    fn test_serialized_form_carries_type() {
        let event: BusinessEvent = ProjectClosed::create_event(
            "http",
            Identity::new("alice"),
            "p-1".into(),
            test_timestamp(),
        )
        .unwrap()
        .into();

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            json!({
                "type": "project_closed",
                "source": "http",
                "time": "2026-01-19T12:00:00Z",
                "publisher": "alice",
                "project_id": "p-1",
            })
        );
        assert_eq!(BusinessEvent::validate(json).unwrap(), event);
    }
}
