// Copyright (c) 2025 - Cowboy AI, Inc.
//! Assign Project Command

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{notify_assignee, CommandOutput, IdentityResolver};
use crate::aggregate::{project, Project};
use crate::authz::ProjectIntent;
use crate::context::Ctx;
use crate::domain::{AggregateKind, Identity, ProjectId, ServiceUser};
use crate::errors::{CommandError, CommandResult, RepositoryError};
use crate::events::{BusinessEvent, EventSchema, NotificationSubject, ProjectAssigned};

/// Reads needed to assign a project
#[async_trait]
pub trait AssignProjectRepository: IdentityResolver {
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, RepositoryError>;
}

/// Hand a project to a user or group
///
/// The new assignee's users are notified. A closed project cannot be
/// reassigned; assigning to the current assignee is a no-op.
#[instrument(
    skip_all,
    fields(
        request_id = %ctx.request_id,
        issuer = %issuer.id,
        project_id = %project_id,
        assignee = %assignee,
    )
)]
pub async fn assign_project<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    project_id: &ProjectId,
    assignee: &Identity,
    repository: &R,
) -> CommandResult<CommandOutput<Project>>
where
    R: AssignProjectRepository + ?Sized,
{
    let project = repository
        .get_project(project_id)
        .await
        .map_err(CommandError::loading(AggregateKind::Project, project_id))?;

    if project.assignee.as_ref() == Some(assignee) {
        debug!("project already assigned");
        return Ok(CommandOutput::unchanged(project));
    }

    // Assignee comes from the caller, so a schema failure is the caller's
    let assigned = ProjectAssigned::create_event(
        &ctx.source,
        issuer.id.clone(),
        project_id.clone(),
        assignee.clone(),
        ctx.time,
    )?;

    if !ctx.is_root(issuer) && !project.permits(issuer, &[ProjectIntent::Assign]) {
        warn!("issuer lacks project.assign");
        return Err(CommandError::NotAuthorized {
            user_id: issuer.id.clone(),
            intent: ProjectIntent::Assign.to_string(),
            target: project_id.to_string(),
        });
    }

    let primary = BusinessEvent::from(assigned);
    let updated = project::apply_event(ctx, &project, &primary).map_err(CommandError::invalid(
        ProjectAssigned::TYPE,
        AggregateKind::Project,
        project_id,
    ))?;

    let notifications = notify_assignee(
        ctx,
        issuer,
        updated.assignee.as_ref(),
        &primary,
        NotificationSubject::project(updated.id.clone()),
        repository,
    )
    .await?;

    let mut new_events = vec![primary];
    new_events.extend(notifications);
    info!(events = new_events.len(), "project assigned");

    Ok(CommandOutput {
        new_events,
        aggregate: updated,
    })
}
