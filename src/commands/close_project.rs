// Copyright (c) 2025 - Cowboy AI, Inc.
//! Close Project Command
//!
//! Closing is one-way. A project closes only once every one of its
//! subprojects is closed, a rule the project reducer cannot check because it
//! never sees sibling aggregates.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{notify_assignee, CommandOutput, IdentityResolver};
use crate::aggregate::{project, Project, Subproject};
use crate::authz::ProjectIntent;
use crate::context::Ctx;
use crate::domain::{AggregateKind, ProjectId, ServiceUser};
use crate::errors::{CommandError, CommandResult, RepositoryError};
use crate::events::{BusinessEvent, EventSchema, NotificationSubject, ProjectClosed};

/// Reads needed to close a project
#[async_trait]
pub trait CloseProjectRepository: IdentityResolver {
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, RepositoryError>;

    /// All subprojects of a project, open or closed
    async fn get_subprojects(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Subproject>, RepositoryError>;
}

/// Close a project
///
/// # Errors
///
/// - `NotFound` if the project does not exist
/// - `Precondition` if subprojects cannot be loaded or any is still open
/// - `NotAuthorized` if a non-root issuer lacks `project.close`
/// - `InvalidCommand` if the reducer rejects the close, including when the
///   repository hands back a different project than the one requested
#[instrument(
    skip_all,
    fields(request_id = %ctx.request_id, issuer = %issuer.id, project_id = %project_id)
)]
pub async fn close_project<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    project_id: &ProjectId,
    repository: &R,
) -> CommandResult<CommandOutput<Project>>
where
    R: CloseProjectRepository + ?Sized,
{
    let project = repository
        .get_project(project_id)
        .await
        .map_err(CommandError::loading(AggregateKind::Project, project_id))?;

    if project.is_closed() {
        debug!("project already closed");
        return Ok(CommandOutput::unchanged(project));
    }

    let closed =
        ProjectClosed::create_event(&ctx.source, issuer.id.clone(), project_id.clone(), ctx.time)
            .map_err(CommandError::construction(ProjectClosed::TYPE))?;

    let subprojects = repository
        .get_subprojects(project_id)
        .await
        .map_err(|cause| CommandError::Precondition {
            event_type: ProjectClosed::TYPE,
            message: format!("could not load subprojects of project {project_id}"),
            cause: Some(cause),
        })?;
    let open: Vec<&str> = subprojects
        .iter()
        .filter(|subproject| !subproject.is_closed())
        .map(|subproject| subproject.id.as_str())
        .collect();
    if !open.is_empty() {
        warn!(open = open.len(), "cannot close project with open subprojects");
        return Err(CommandError::Precondition {
            event_type: ProjectClosed::TYPE,
            message: format!("subprojects still open: {}", open.join(", ")),
            cause: None,
        });
    }

    if !ctx.is_root(issuer) && !project.permits(issuer, &[ProjectIntent::Close]) {
        warn!("issuer lacks project.close");
        return Err(CommandError::NotAuthorized {
            user_id: issuer.id.clone(),
            intent: ProjectIntent::Close.to_string(),
            target: project_id.to_string(),
        });
    }

    let primary = BusinessEvent::from(closed);
    let updated = project::apply_event(ctx, &project, &primary).map_err(CommandError::invalid(
        ProjectClosed::TYPE,
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
    info!(events = new_events.len(), "project closed");

    Ok(CommandOutput {
        new_events,
        aggregate: updated,
    })
}
