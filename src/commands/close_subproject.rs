// Copyright (c) 2025 - Cowboy AI, Inc.
//! Close Subproject Command

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{notify_assignee, CommandOutput, IdentityResolver};
use crate::aggregate::{subproject, Subproject, Workflowitem};
use crate::authz::SubprojectIntent;
use crate::context::Ctx;
use crate::domain::{AggregateKind, ProjectId, ServiceUser, SubprojectId};
use crate::errors::{CommandError, CommandResult, RepositoryError};
use crate::events::{BusinessEvent, EventSchema, NotificationSubject, SubprojectClosed};

/// Reads needed to close a subproject
#[async_trait]
pub trait CloseSubprojectRepository: IdentityResolver {
    async fn get_subproject(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
    ) -> Result<Subproject, RepositoryError>;

    async fn get_workflowitems(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
    ) -> Result<Vec<Workflowitem>, RepositoryError>;
}

/// Close a subproject once all of its workflow items are closed
#[instrument(
    skip_all,
    fields(
        request_id = %ctx.request_id,
        issuer = %issuer.id,
        project_id = %project_id,
        subproject_id = %subproject_id,
    )
)]
pub async fn close_subproject<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    project_id: &ProjectId,
    subproject_id: &SubprojectId,
    repository: &R,
) -> CommandResult<CommandOutput<Subproject>>
where
    R: CloseSubprojectRepository + ?Sized,
{
    let subproject = repository
        .get_subproject(project_id, subproject_id)
        .await
        .map_err(CommandError::loading(AggregateKind::Subproject, subproject_id))?;

    if subproject.is_closed() {
        debug!("subproject already closed");
        return Ok(CommandOutput::unchanged(subproject));
    }

    let closed = SubprojectClosed::create_event(
        &ctx.source,
        issuer.id.clone(),
        project_id.clone(),
        subproject_id.clone(),
        ctx.time,
    )
    .map_err(CommandError::construction(SubprojectClosed::TYPE))?;

    let items = repository
        .get_workflowitems(project_id, subproject_id)
        .await
        .map_err(|cause| CommandError::Precondition {
            event_type: SubprojectClosed::TYPE,
            message: format!("could not load workflowitems of subproject {subproject_id}"),
            cause: Some(cause),
        })?;
    let open: Vec<&str> = items
        .iter()
        .filter(|item| !item.is_closed())
        .map(|item| item.id.as_str())
        .collect();
    if !open.is_empty() {
        warn!(open = open.len(), "cannot close subproject with open workflowitems");
        return Err(CommandError::Precondition {
            event_type: SubprojectClosed::TYPE,
            message: format!("workflowitems still open: {}", open.join(", ")),
            cause: None,
        });
    }

    if !ctx.is_root(issuer) && !subproject.permits(issuer, &[SubprojectIntent::Close]) {
        warn!("issuer lacks subproject.close");
        return Err(CommandError::NotAuthorized {
            user_id: issuer.id.clone(),
            intent: SubprojectIntent::Close.to_string(),
            target: subproject_id.to_string(),
        });
    }

    let primary = BusinessEvent::from(closed);
    let updated = subproject::apply_event(ctx, &subproject, &primary).map_err(CommandError::invalid(
        SubprojectClosed::TYPE,
        AggregateKind::Subproject,
        subproject_id,
    ))?;

    let notifications = notify_assignee(
        ctx,
        issuer,
        updated.assignee.as_ref(),
        &primary,
        NotificationSubject::subproject(updated.project_id.clone(), updated.id.clone()),
        repository,
    )
    .await?;

    let mut new_events = vec![primary];
    new_events.extend(notifications);
    info!(events = new_events.len(), "subproject closed");

    Ok(CommandOutput {
        new_events,
        aggregate: updated,
    })
}
