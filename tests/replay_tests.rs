// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for log replay
//!
//! A command's dry run and the repository's replay must agree: appending the
//! returned events to the log and folding it again yields the aggregate the
//! command returned.

mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;

use workflow_domain::aggregate::project::{create_from_event, source_projects};
use workflow_domain::aggregate::subproject::source_subprojects;
use workflow_domain::authz::{Permissions, ProjectIntent};
use workflow_domain::commands::close_project;
use workflow_domain::domain::{Identity, ProjectId, SubprojectId};
use workflow_domain::events::{
    InitialProjectData, InitialSubprojectData, ProjectCreated, SubprojectClosed, SubprojectCreated,
};
use workflow_domain::{BusinessEvent, ServiceUser, Status};

fn project_created() -> ProjectCreated {
    ProjectCreated::create_event(
        "http",
        Identity::new("root"),
        InitialProjectData {
            id: ProjectId::new(PROJECT_ID),
            status: Status::Open,
            display_name: "Road works".to_string(),
            description: String::new(),
            assignee: Some(Identity::new("alice")),
            permissions: [(ProjectIntent::Close, Identity::new("alice"))]
                .into_iter()
                .collect(),
        },
        fixed_timestamp(),
    )
    .unwrap()
}

fn subproject_log() -> Vec<BusinessEvent> {
    vec![
        SubprojectCreated::create_event(
            "http",
            Identity::new("alice"),
            ProjectId::new(PROJECT_ID),
            InitialSubprojectData {
                id: SubprojectId::new(SUBPROJECT_ID),
                status: Status::Open,
                display_name: "Drainage".to_string(),
                assignee: None,
                permissions: Permissions::new(),
            },
            fixed_timestamp(),
        )
        .unwrap()
        .into(),
        SubprojectClosed::create_event(
            "http",
            Identity::new("alice"),
            ProjectId::new(PROJECT_ID),
            SubprojectId::new(SUBPROJECT_ID),
            fixed_timestamp(),
        )
        .unwrap()
        .into(),
    ]
}

/// Test: dry run result equals the state replayed from the appended log
#[tokio::test]
async fn test_command_output_matches_replay() {
    // Arrange - materialize state the way a repository would
    let mut log: Vec<BusinessEvent> = vec![project_created().into()];
    log.extend(subproject_log());

    let project = source_projects(&ctx(), &log).aggregates[&ProjectId::new(PROJECT_ID)].clone();
    let subprojects = source_subprojects(&ctx(), &log).aggregates.into_values();
    let repository = subprojects.fold(
        InMemoryRepository::new().with_project(project),
        InMemoryRepository::with_subproject,
    );

    // Act
    let alice = ServiceUser::new("alice");
    let output = close_project(&ctx(), &alice, &ProjectId::new(PROJECT_ID), &repository)
        .await
        .unwrap();
    log.extend(output.new_events.iter().cloned());

    // Assert
    let replayed = source_projects(&ctx(), &log);
    assert!(replayed.errors.is_empty());
    assert_eq!(replayed.aggregates[&ProjectId::new(PROJECT_ID)], output.aggregate);
}

#[test]
fn test_replay_after_persisted_round_trip() {
    let mut log: Vec<BusinessEvent> = vec![project_created().into()];
    log.extend(subproject_log());

    let stored: Vec<serde_json::Value> = log
        .iter()
        .map(|event| serde_json::to_value(event).unwrap())
        .collect();
    let restored: Vec<BusinessEvent> = stored
        .into_iter()
        .map(|value| BusinessEvent::validate(value).unwrap())
        .collect();

    assert_eq!(source_subprojects(&ctx(), &restored), source_subprojects(&ctx(), &log));
}

#[test]
fn test_creation_state_matches_event() {
    let event = project_created();

    let project = create_from_event(&ctx(), &event).unwrap();

    assert_eq!(project.assignee, event.project.assignee);
    assert_eq!(project.permissions, event.project.permissions);
    assert_eq!(project.created_at, event.time);
}
