// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subproject Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_holders, require_identity, require_non_empty, EventSchema};
use crate::authz::{Permissions, SubprojectIntent};
use crate::domain::{Identity, ProjectId, Status, SubprojectId};
use crate::errors::{SchemaResult, SchemaViolation};

/// Initial state of a subproject as recorded by its creation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialSubprojectData {
    pub id: SubprojectId,
    pub status: Status,
    pub display_name: String,
    #[serde(default)]
    pub assignee: Option<Identity>,
    #[serde(default)]
    pub permissions: Permissions<SubprojectIntent>,
}

/// Subproject was created inside a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubprojectCreated {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub subproject: InitialSubprojectData,
}

impl SubprojectCreated {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        subproject: InitialSubprojectData,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            subproject,
        })
    }
}

impl EventSchema for SubprojectCreated {
    const TYPE: &'static str = "subproject_created";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_non_empty("subproject.id", self.subproject.id.as_str())?;
        require_non_empty("subproject.display_name", &self.subproject.display_name)?;
        if let Some(assignee) = &self.subproject.assignee {
            require_identity("subproject.assignee", assignee)?;
        }
        require_holders("subproject.permissions", &self.subproject.permissions)
    }
}

business_event!(SubprojectCreated);

/// Subproject was closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubprojectClosed {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub project_id: ProjectId,
    pub subproject_id: SubprojectId,
}

impl SubprojectClosed {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        project_id: ProjectId,
        subproject_id: SubprojectId,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            project_id,
            subproject_id,
        })
    }
}

impl EventSchema for SubprojectClosed {
    const TYPE: &'static str = "subproject_closed";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        require_non_empty("subproject_id", self.subproject_id.as_str())
    }
}

business_event!(SubprojectClosed);
