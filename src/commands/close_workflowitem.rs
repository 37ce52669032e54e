// Copyright (c) 2025 - Cowboy AI, Inc.
//! Close Workflow Item Command
//!
//! Workflow items are leaves: closing one has no child precondition.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{notify_assignee, CommandOutput, IdentityResolver};
use crate::aggregate::{workflowitem, Workflowitem};
use crate::authz::WorkflowitemIntent;
use crate::context::Ctx;
use crate::domain::{AggregateKind, ProjectId, ServiceUser, SubprojectId, WorkflowitemId};
use crate::errors::{CommandError, CommandResult, RepositoryError};
use crate::events::{BusinessEvent, EventSchema, NotificationSubject, WorkflowitemClosed};

/// Reads needed to close a workflow item
#[async_trait]
pub trait CloseWorkflowitemRepository: IdentityResolver {
    async fn get_workflowitem(
        &self,
        project_id: &ProjectId,
        subproject_id: &SubprojectId,
        workflowitem_id: &WorkflowitemId,
    ) -> Result<Workflowitem, RepositoryError>;
}

#[instrument(
    skip_all,
    fields(
        request_id = %ctx.request_id,
        issuer = %issuer.id,
        project_id = %project_id,
        subproject_id = %subproject_id,
        workflowitem_id = %workflowitem_id,
    )
)]
pub async fn close_workflowitem<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    project_id: &ProjectId,
    subproject_id: &SubprojectId,
    workflowitem_id: &WorkflowitemId,
    repository: &R,
) -> CommandResult<CommandOutput<Workflowitem>>
where
    R: CloseWorkflowitemRepository + ?Sized,
{
    let item = repository
        .get_workflowitem(project_id, subproject_id, workflowitem_id)
        .await
        .map_err(CommandError::loading(AggregateKind::Workflowitem, workflowitem_id))?;

    if item.is_closed() {
        debug!("workflowitem already closed");
        return Ok(CommandOutput::unchanged(item));
    }

    let closed = WorkflowitemClosed::create_event(
        &ctx.source,
        issuer.id.clone(),
        project_id.clone(),
        subproject_id.clone(),
        workflowitem_id.clone(),
        ctx.time,
    )
    .map_err(CommandError::construction(WorkflowitemClosed::TYPE))?;

    if !ctx.is_root(issuer) && !item.permits(issuer, &[WorkflowitemIntent::Close]) {
        warn!("issuer lacks workflowitem.close");
        return Err(CommandError::NotAuthorized {
            user_id: issuer.id.clone(),
            intent: WorkflowitemIntent::Close.to_string(),
            target: workflowitem_id.to_string(),
        });
    }

    let primary = BusinessEvent::from(closed);
    let updated = workflowitem::apply_event(ctx, &item, &primary).map_err(CommandError::invalid(
        WorkflowitemClosed::TYPE,
        AggregateKind::Workflowitem,
        workflowitem_id,
    ))?;

    let notifications = notify_assignee(
        ctx,
        issuer,
        updated.assignee.as_ref(),
        &primary,
        NotificationSubject::workflowitem(
            updated.project_id.clone(),
            updated.subproject_id.clone(),
            updated.id.clone(),
        ),
        repository,
    )
    .await?;

    let mut new_events = vec![primary];
    new_events.extend(notifications);
    info!(events = new_events.len(), "workflowitem closed");

    Ok(CommandOutput {
        new_events,
        aggregate: updated,
    })
}
