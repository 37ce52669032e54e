// Copyright (c) 2025 - Cowboy AI, Inc.
//! Workflow Item Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_holders, require_identity, require_non_empty, EventSchema};
use crate::authz::{Permissions, WorkflowitemIntent};
use crate::domain::{Identity, ProjectId, Status, SubprojectId, WorkflowitemId};
use crate::errors::{SchemaResult, SchemaViolation};

/// Initial state of a workflow item as recorded by its creation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialWorkflowitemData {
    pub id: WorkflowitemId,
    pub status: Status,
    pub display_name: String,
    #[serde(default)]
    pub assignee: Option<Identity>,
    #[serde(default)]
    pub permissions: Permissions<WorkflowitemIntent>,
}

/// Workflow item was created inside a subproject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowitemCreated {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub subproject_id: SubprojectId,
    pub workflowitem: InitialWorkflowitemData,
}

impl WorkflowitemCreated {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        subproject_id: SubprojectId,
        workflowitem: InitialWorkflowitemData,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            subproject_id,
            workflowitem,
        })
    }
}

impl EventSchema for WorkflowitemCreated {
    const TYPE: &'static str = "workflowitem_created";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_non_empty("subproject_id", self.subproject_id.as_str())?;
        require_non_empty("workflowitem.id", self.workflowitem.id.as_str())?;
        require_non_empty("workflowitem.display_name", &self.workflowitem.display_name)?;
        if let Some(assignee) = &self.workflowitem.assignee {
            require_identity("workflowitem.assignee", assignee)?;
        }
        require_holders("workflowitem.permissions", &self.workflowitem.permissions)
    }
}

business_event!(WorkflowitemCreated);

/// Workflow item was closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowitemClosed {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub subproject_id: SubprojectId,
    pub workflowitem_id: WorkflowitemId,
}

impl WorkflowitemClosed {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        subproject_id: SubprojectId,
        workflowitem_id: WorkflowitemId,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            subproject_id,
            workflowitem_id,
        })
    }
}

impl EventSchema for WorkflowitemClosed {
    const TYPE: &'static str = "workflowitem_closed";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_non_empty("subproject_id", self.subproject_id.as_str())?;
        require_non_empty("workflowitem_id", self.workflowitem_id.as_str())
    }
}

business_event!(WorkflowitemClosed);
