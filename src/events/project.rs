// Copyright (c) 2025 - Cowboy AI, Inc.
//! Project Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_holders, require_identity, require_non_empty, EventSchema};
use crate::authz::{Permissions, ProjectIntent};
use crate::domain::{Identity, ProjectId, Status};
use crate::errors::{SchemaResult, SchemaViolation};

/// Initial state of a project as recorded by its creation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialProjectData {
    pub id: ProjectId,
    pub status: Status,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<Identity>,
    #[serde(default)]
    pub permissions: Permissions<ProjectIntent>,
}

/// Project was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCreated {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project: InitialProjectData,
}

impl ProjectCreated {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project: InitialProjectData,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project,
        })
    }
}

impl EventSchema for ProjectCreated {
    const TYPE: &'static str = "project_created";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project.id", self.project.id.as_str())?;
        require_non_empty("project.display_name", &self.project.display_name)?;
        if let Some(assignee) = &self.project.assignee {
            require_identity("project.assignee", assignee)?;
        }
        require_holders("project.permissions", &self.project.permissions)
    }
}

business_event!(ProjectCreated);

/// Project was assigned to a user or group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssigned {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub assignee: Identity,
}

impl ProjectAssigned {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        assignee: Identity,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            assignee,
        })
    }
}

impl EventSchema for ProjectAssigned {
    const TYPE: &'static str = "project_assigned";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_identity("assignee", &self.assignee)
    }
}

business_event!(ProjectAssigned);

/// A project intent was granted to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPermissionGranted {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub permission: ProjectIntent,
    pub grantee: Identity,
}

impl ProjectPermissionGranted {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        permission: ProjectIntent,
        grantee: Identity,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            permission,
            grantee,
        })
    }
}

impl EventSchema for ProjectPermissionGranted {
    const TYPE: &'static str = "project_permission_granted";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_identity("grantee", &self.grantee)
    }
}

business_event!(ProjectPermissionGranted);

/// A project intent was taken away from an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPermissionRevoked {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub permission: ProjectIntent,
    pub revokee: Identity,
}

impl ProjectPermissionRevoked {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        permission: ProjectIntent,
        revokee: Identity,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            permission,
            revokee,
        })
    }
}

impl EventSchema for ProjectPermissionRevoked {
    const TYPE: &'static str = "project_permission_revoked";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_identity("revokee", &self.revokee)
    }
}

business_event!(ProjectPermissionRevoked);

/// Project was closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectClosed {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
}

impl ProjectClosed {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
        })
    }
}

impl EventSchema for ProjectClosed {
    const TYPE: &'static str = "project_closed";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())
    }
}

business_event!(ProjectClosed);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_timestamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn initial_project() -> InitialProjectData {
        InitialProjectData {
            id: ProjectId::new("p-1"),
            status: Status::Open,
            display_name: "Road works".to_string(),
            description: String::new(),
            assignee: Some(Identity::new("alice")),
            permissions: [(ProjectIntent::Close, Identity::new("alice"))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_project_closed_rejects_empty_publisher() {
        let result = ProjectClosed::create_event(
            "http",
            Identity::new(""),
            ProjectId::new("p-1"),
            test_timestamp(),
        );

        assert_eq!(
            result.unwrap_err().violation,
            SchemaViolation::EmptyField("publisher")
        );
    }

    #[test]
    fn test_project_created_rejects_empty_display_name() {
        let mut project = initial_project();
        project.display_name.clear();

        let err =
            ProjectCreated::create_event("http", Identity::new("root"), project, test_timestamp())
                .unwrap_err();

        assert_eq!(err.violation, SchemaViolation::EmptyField("project.display_name"));
    }

    #[test]
    fn test_project_created_rejects_empty_permission_holder() {
        let mut project = initial_project();
        project.permissions = project
            .permissions
            .granted(ProjectIntent::ViewSummary, Identity::new(""));

        let err =
            ProjectCreated::create_event("http", Identity::new("root"), project, test_timestamp())
                .unwrap_err();

        assert!(matches!(
            err.violation,
            SchemaViolation::InvalidField { field: "project.permissions", .. }
        ));
    }

    #[test]
    fn test_project_created_defaults_optional_fields() {
        let payload = json!({
            "type": "project_created",
            "source": "http",
            "time": "2026-01-19T12:00:00Z",
            "publisher": "root",
            "project": {
                "id": "p-1",
                "status": "open",
                "display_name": "Road works",
            },
        });

        let event = ProjectCreated::validate(payload).unwrap();

        assert_eq!(event.project.assignee, None);
        assert!(event.project.permissions.is_empty());
    }

    #[test]
    fn test_permission_granted_rejects_global_intent() {
        let payload = json!({
            "type": "project_permission_granted",
            "source": "http",
            "time": "2026-01-19T12:00:00Z",
            "publisher": "root",
            "project_id": "p-1",
            "permission": "global.createProject",
            "grantee": "alice",
        });

        assert!(ProjectPermissionGranted::validate(payload).is_err());
    }
}
