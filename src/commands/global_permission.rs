// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Permission Commands
//!
//! Grant and revoke organization-wide intents. Both are idempotent and
//! produce no notifications.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::CommandOutput;
use crate::aggregate::{global, GlobalPermissions};
use crate::authz::GlobalIntent;
use crate::context::Ctx;
use crate::domain::{AggregateKind, Identity, ServiceUser};
use crate::errors::{CommandError, CommandResult, RepositoryError};
use crate::events::{BusinessEvent, EventSchema, GlobalPermissionGranted, GlobalPermissionRevoked};

const TARGET: &str = "global";

/// Reads needed to change global permissions
#[async_trait]
pub trait GlobalPermissionsRepository: Send + Sync {
    async fn get_global_permissions(&self) -> Result<GlobalPermissions, RepositoryError>;
}

async fn load<R>(repository: &R) -> CommandResult<GlobalPermissions>
where
    R: GlobalPermissionsRepository + ?Sized,
{
    repository
        .get_global_permissions()
        .await
        .map_err(CommandError::Repository)
}

fn authorize(
    ctx: &Ctx,
    issuer: &ServiceUser,
    current: &GlobalPermissions,
    intent: GlobalIntent,
) -> CommandResult<()> {
    if ctx.is_root(issuer) || current.permits(issuer, &[intent]) {
        return Ok(());
    }
    warn!(%intent, "issuer lacks global intent");
    Err(CommandError::NotAuthorized {
        user_id: issuer.id.clone(),
        intent: intent.to_string(),
        target: TARGET.to_string(),
    })
}

fn dry_run(
    ctx: &Ctx,
    current: &GlobalPermissions,
    event: BusinessEvent,
    event_type: &'static str,
) -> CommandResult<CommandOutput<GlobalPermissions>> {
    let updated = global::apply_event(ctx, current, &event).map_err(CommandError::invalid(
        event_type,
        AggregateKind::GlobalPermissions,
        TARGET,
    ))?;
    Ok(CommandOutput {
        new_events: vec![event],
        aggregate: updated,
    })
}

/// Grant a global intent to a user or group
#[instrument(
    skip_all,
    fields(request_id = %ctx.request_id, issuer = %issuer.id, grantee = %grantee, intent = %intent)
)]
pub async fn grant_global_permission<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    grantee: &Identity,
    intent: GlobalIntent,
    repository: &R,
) -> CommandResult<CommandOutput<GlobalPermissions>>
where
    R: GlobalPermissionsRepository + ?Sized,
{
    let current = load(repository).await?;

    if current.permissions.is_granted(&intent, grantee) {
        debug!("permission already granted");
        return Ok(CommandOutput::unchanged(current));
    }

    let granted = GlobalPermissionGranted::create_event(
        &ctx.source,
        issuer.id.clone(),
        intent,
        grantee.clone(),
        ctx.time,
    )?;

    authorize(ctx, issuer, &current, GlobalIntent::GrantPermission)?;

    let output = dry_run(ctx, &current, granted.into(), GlobalPermissionGranted::TYPE)?;
    info!("global permission granted");
    Ok(output)
}

/// Revoke a global intent from a user or group
#[instrument(
    skip_all,
    fields(request_id = %ctx.request_id, issuer = %issuer.id, revokee = %revokee, intent = %intent)
)]
pub async fn revoke_global_permission<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    revokee: &Identity,
    intent: GlobalIntent,
    repository: &R,
) -> CommandResult<CommandOutput<GlobalPermissions>>
where
    R: GlobalPermissionsRepository + ?Sized,
{
    let current = load(repository).await?;

    if !current.permissions.is_granted(&intent, revokee) {
        debug!("permission already absent");
        return Ok(CommandOutput::unchanged(current));
    }

    let revoked = GlobalPermissionRevoked::create_event(
        &ctx.source,
        issuer.id.clone(),
        intent,
        revokee.clone(),
        ctx.time,
    )?;

    authorize(ctx, issuer, &current, GlobalIntent::RevokePermission)?;

    let output = dry_run(ctx, &current, revoked.into(), GlobalPermissionRevoked::TYPE)?;
    info!("global permission revoked");
    Ok(output)
}
