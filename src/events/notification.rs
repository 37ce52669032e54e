// Copyright (c) 2025 - Cowboy AI, Inc.
//! Notification Events
//!
//! A notification tells one recipient that a business event touched something
//! they are responsible for. It embeds the causing event verbatim, so it is
//! always appended after that event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_identity, require_non_empty, BusinessEvent, EventSchema};
use crate::domain::{Identity, ProjectId, SubprojectId, WorkflowitemId};
use crate::errors::{SchemaResult, SchemaViolation};

/// Aggregate a notification is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSubject {
    pub project_id: ProjectId,
    pub subproject_id: Option<SubprojectId>,
    pub workflowitem_id: Option<WorkflowitemId>,
}

impl NotificationSubject {
    pub fn project(project_id: ProjectId) -> Self {
        Self {
            project_id,
            subproject_id: None,
            workflowitem_id: None,
        }
    }

    pub fn subproject(project_id: ProjectId, subproject_id: SubprojectId) -> Self {
        Self {
            subproject_id: Some(subproject_id),
            ..Self::project(project_id)
        }
    }

    pub fn workflowitem(
        project_id: ProjectId,
        subproject_id: SubprojectId,
        workflowitem_id: WorkflowitemId,
    ) -> Self {
        Self {
            workflowitem_id: Some(workflowitem_id),
            ..Self::subproject(project_id, subproject_id)
        }
    }
}

/// A recipient was notified about a business event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCreated {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,
    pub publisher: Identity,
    pub notification_id: Uuid,
    pub recipient: Identity,

    /// The event that caused this notification
    pub business_event: Box<BusinessEvent>,

    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subproject_id: Option<SubprojectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflowitem_id: Option<WorkflowitemId>,
}

impl NotificationCreated {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        notification_id: Uuid,
        recipient: Identity,
        business_event: BusinessEvent,
        subject: NotificationSubject,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            notification_id,
            recipient,
            business_event: Box::new(business_event),
            project_id: subject.project_id,
            subproject_id: subject.subproject_id,
            workflowitem_id: subject.workflowitem_id,
        })
    }

    pub fn subject(&self) -> NotificationSubject {
        NotificationSubject {
            project_id: self.project_id.clone(),
            subproject_id: self.subproject_id.clone(),
            workflowitem_id: self.workflowitem_id.clone(),
        }
    }
}

impl EventSchema for NotificationCreated {
    const TYPE: &'static str = "notification_created";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_identity("recipient", &self.recipient)?;
        require_non_empty("project_id", self.project_id.as_str())?;
        if matches!(*self.business_event, BusinessEvent::NotificationCreated(_)) {
            return Err(SchemaViolation::InvalidField {
                field: "business_event",
                reason: "a notification cannot be caused by another notification".to_string(),
            });
        }
        self.business_event
            .check()
            .map_err(|err| SchemaViolation::InvalidField {
                field: "business_event",
                reason: err.to_string(),
            })
    }
}

business_event!(NotificationCreated);
