// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for workflow-domain
//!
//! Deterministic aggregates, contexts and an in-memory repository.
//!
//! # Design Principles
//! - All test data is deterministic (no random ids, no `Utc::now()`)
//! - The in-memory repository implements every command port, so one value
//!   can back any command under test

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use workflow_domain::aggregate::{GlobalPermissions, Project, Subproject, Workflowitem};
use workflow_domain::authz::{
    GlobalIntent, Permissions, ProjectIntent, SubprojectIntent, WorkflowitemIntent,
};
use workflow_domain::commands::{
    AssignProjectRepository, CloseProjectRepository, CloseSubprojectRepository,
    CloseWorkflowitemRepository, GlobalPermissionsRepository, IdentityResolver,
};
use workflow_domain::domain::{AggregateKind, Identity, ProjectId, SubprojectId, WorkflowitemId};
use workflow_domain::errors::RepositoryError;
use workflow_domain::{Ctx, DomainConfig, Status};

pub const REQUEST_ID: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const PROJECT_ID: &str = "p-1";
pub const SUBPROJECT_ID: &str = "s-1";
pub const WORKFLOWITEM_ID: &str = "w-1";

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn ctx() -> Ctx {
    Ctx::new(
        &DomainConfig::default(),
        Uuid::parse_str(REQUEST_ID).expect("Invalid UUID in test fixture"),
        fixed_timestamp(),
    )
}

/// Install a `RUST_LOG`-driven subscriber; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn project_fixture(status: Status, assignee: Option<&str>) -> Project {
    Project {
        id: ProjectId::new(PROJECT_ID),
        created_at: fixed_timestamp(),
        status,
        display_name: "Road works".to_string(),
        description: "Resurface the ring road".to_string(),
        assignee: assignee.map(Identity::new),
        permissions: Permissions::new(),
        version: 1,
    }
}

pub fn with_project_grants(mut project: Project, grants: &[(ProjectIntent, &str)]) -> Project {
    for (intent, identity) in grants {
        project.permissions = project.permissions.granted(*intent, Identity::new(*identity));
    }
    project
}

pub fn subproject_fixture(id: &str, status: Status, assignee: Option<&str>) -> Subproject {
    Subproject {
        project_id: ProjectId::new(PROJECT_ID),
        id: SubprojectId::new(id),
        created_at: fixed_timestamp(),
        status,
        display_name: format!("Subproject {id}"),
        assignee: assignee.map(Identity::new),
        permissions: Permissions::new(),
        version: 1,
    }
}

pub fn with_subproject_grants(
    mut subproject: Subproject,
    grants: &[(SubprojectIntent, &str)],
) -> Subproject {
    for (intent, identity) in grants {
        subproject.permissions = subproject
            .permissions
            .granted(*intent, Identity::new(*identity));
    }
    subproject
}

pub fn workflowitem_fixture(id: &str, status: Status, assignee: Option<&str>) -> Workflowitem {
    Workflowitem {
        project_id: ProjectId::new(PROJECT_ID),
        subproject_id: SubprojectId::new(SUBPROJECT_ID),
        id: WorkflowitemId::new(id),
        created_at: fixed_timestamp(),
        status,
        display_name: format!("Item {id}"),
        assignee: assignee.map(Identity::new),
        permissions: Permissions::new(),
        version: 1,
    }
}

pub fn with_workflowitem_grants(
    mut item: Workflowitem,
    grants: &[(WorkflowitemIntent, &str)],
) -> Workflowitem {
    for (intent, identity) in grants {
        item.permissions = item.permissions.granted(*intent, Identity::new(*identity));
    }
    item
}

/// Repository backed by plain collections
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    pub projects: HashMap<ProjectId, Project>,
    pub subprojects: Vec<Subproject>,
    pub workflowitems: Vec<Workflowitem>,
    pub groups: HashMap<Identity, Vec<Identity>>,
    pub global: GlobalPermissions,

    /// Child listings fail with `Unavailable`
    pub children_unavailable: bool,

    /// Global permission reads fail with `Unavailable`
    pub global_unavailable: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.id.clone(), project);
        self
    }

    pub fn with_subproject(mut self, subproject: Subproject) -> Self {
        self.subprojects.push(subproject);
        self
    }

    pub fn with_workflowitem(mut self, item: Workflowitem) -> Self {
        self.workflowitems.push(item);
        self
    }

    pub fn with_group(mut self, group: &str, members: &[&str]) -> Self {
        self.groups.insert(
            Identity::new(group),
            members.iter().copied().map(Identity::new).collect(),
        );
        self
    }

    pub fn with_global_grant(mut self, intent: GlobalIntent, identity: &str) -> Self {
        self.global.permissions = self.global.permissions.granted(intent, Identity::new(identity));
        self
    }

    pub fn with_unavailable_children(mut self) -> Self {
        self.children_unavailable = true;
        self
    }

    pub fn with_unavailable_global(mut self) -> Self {
        self.global_unavailable = true;
        self
    }

    fn project(&self, project_id: &ProjectId) -> Result<Project, RepositoryError> {
        self.projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                kind: AggregateKind::Project,
                id: project_id.to_string(),
            })
    }

    fn unavailable() -> RepositoryError {
        RepositoryError::Unavailable("store offline".to_string())
    }
}

#[async_trait]
impl IdentityResolver for InMemoryRepository {
    async fn get_users_for_identity(&self, identity: &Identity) -> Vec<Identity> {
        self.groups
            .get(identity)
            .cloned()
            .unwrap_or_else(|| vec![identity.clone()])
    }
}

#[async_trait]
impl CloseProjectRepository for InMemoryRepository {
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, RepositoryError> {
        self.project(project_id)
    }

    async fn get_subprojects(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Subproject>, RepositoryError> {
        if self.children_unavailable {
            return Err(Self::unavailable());
        }
        Ok(self
            .subprojects
            .iter()
            .filter(|subproject| &subproject.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignProjectRepository for InMemoryRepository {
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, RepositoryError> {
        self.project(project_id)
    }
}

#[async_trait]
impl CloseSubprojectRepository for InMemoryRepository {
    async fn get_subproject(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
    ) -> Result<Subproject, RepositoryError> {
        self.subprojects
            .iter()
            .find(|s| &s.project_id == project_id && &s.id == subproject_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                kind: AggregateKind::Subproject,
                id: subproject_id.to_string(),
            })
    }

    async fn get_workflowitems(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
    ) -> Result<Vec<Workflowitem>, RepositoryError> {
        if self.children_unavailable {
            return Err(Self::unavailable());
        }
        Ok(self
            .workflowitems
            .iter()
            .filter(|w| &w.project_id == project_id && &w.subproject_id == subproject_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CloseWorkflowitemRepository for InMemoryRepository {
    async fn get_workflowitem(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
        workflowitem_id: &WorkflowitemId,
    ) -> Result<Workflowitem, RepositoryError> {
        self.workflowitems
            .iter()
            .find(|w| {
                &w.project_id == project_id
                    && &w.subproject_id == subproject_id
                    && &w.id == workflowitem_id
            })
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                kind: AggregateKind::Workflowitem,
                id: workflowitem_id.to_string(),
            })
    }
}

#[async_trait]
impl GlobalPermissionsRepository for InMemoryRepository {
    async fn get_global_permissions(&self) -> Result<GlobalPermissions, RepositoryError> {
        if self.global_unavailable {
            return Err(Self::unavailable());
        }
        Ok(self.global.clone())
    }
}
