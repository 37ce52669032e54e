// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command Orchestration
//!
//! One async function per use case, all with the same shape:
//!
//! ```text
//! command(ctx, issuer, target…, repository) → Result<CommandOutput<A>, CommandError>
//! ```
//!
//! Every command runs the same gates, in order, and stops at the first
//! failure:
//!
//! 1. **Load** the target aggregate
//! 2. **Idempotence**: already in the requested state → no events
//! 3. **Synthesize** the candidate event
//! 4. **Preconditions** on related aggregates the reducer cannot see
//! 5. **Authorize**, with an explicit root bypass
//! 6. **Dry run** the candidate through the reducer
//! 7. **Notify** the users behind the aggregate's assignee, except the issuer
//! 8. **Return** `[primary, …notifications]` and the updated aggregate
//!
//! Nothing is persisted here. The caller appends `new_events` in order,
//! guarded by the aggregate `version` it loaded.
//!
//! # Repositories
//!
//! Each command declares its own repository port holding only the reads it
//! needs. All ports that notify extend [`IdentityResolver`].

pub mod assign_project;
pub mod close_project;
pub mod close_subproject;
pub mod close_workflowitem;
pub mod global_permission;

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::Ctx;
use crate::domain::{Identity, ServiceUser};
use crate::errors::{CommandError, CommandResult};
use crate::events::{BusinessEvent, EventSchema, NotificationCreated, NotificationSubject};

pub use assign_project::{assign_project, AssignProjectRepository};
pub use close_project::{close_project, CloseProjectRepository};
pub use close_subproject::{close_subproject, CloseSubprojectRepository};
pub use close_workflowitem::{close_workflowitem, CloseWorkflowitemRepository};
pub use global_permission::{
    grant_global_permission, revoke_global_permission, GlobalPermissionsRepository,
};

/// Events to append and the aggregate as it looks after them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput<A> {
    /// Primary event first, derived notifications after it
    pub new_events: Vec<BusinessEvent>,
    pub aggregate: A,
}

impl<A> CommandOutput<A> {
    /// No-op result of an idempotent command
    pub fn unchanged(aggregate: A) -> Self {
        Self {
            new_events: Vec::new(),
            aggregate,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.new_events.is_empty()
    }
}

/// Resolves an identity to the users behind it
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// A user resolves to itself, a group to its members
    ///
    /// Unknown identities resolve to nothing.
    async fn get_users_for_identity(&self, identity: &Identity) -> Vec<Identity>;
}

/// Deterministic notification id for one recipient of one request
pub fn notification_id(ctx: &Ctx, recipient: &Identity) -> Uuid {
    Uuid::new_v5(&ctx.request_id, recipient.as_str().as_bytes())
}

/// Notifications for everyone behind `assignee`, except the issuer
///
/// Recipients keep the resolver's order; duplicates are dropped.
pub(crate) async fn notify_assignee<R>(
    ctx: &Ctx,
    issuer: &ServiceUser,
    assignee: Option<&Identity>,
    cause: &BusinessEvent,
    subject: NotificationSubject,
    repository: &R,
) -> CommandResult<Vec<BusinessEvent>>
where
    R: IdentityResolver + ?Sized,
{
    let Some(assignee) = assignee else {
        return Ok(Vec::new());
    };

    let mut recipients: Vec<Identity> = Vec::new();
    for user in repository.get_users_for_identity(assignee).await {
        if user != issuer.id && !recipients.contains(&user) {
            recipients.push(user);
        }
    }
    tracing::debug!(%assignee, recipients = recipients.len(), "resolved notification recipients");

    recipients
        .into_iter()
        .map(|recipient| {
            NotificationCreated::create_event(
                &ctx.source,
                issuer.id.clone(),
                notification_id(ctx, &recipient),
                recipient,
                cause.clone(),
                subject.clone(),
                ctx.time,
            )
            .map(BusinessEvent::from)
            .map_err(CommandError::construction(NotificationCreated::TYPE))
        })
        .collect()
}
