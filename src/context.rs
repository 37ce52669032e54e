// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-request context passed to every command and reducer

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::DomainConfig;
use crate::domain::{Identity, ServiceUser};

/// Request context
///
/// Carries everything a command would otherwise read from globals: the
/// request id, the event source and the current time. The core never calls
/// `Utc::now()`; the caller decides what "now" is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ctx {
    /// Correlates all events produced by one request
    pub request_id: Uuid,

    /// Provenance written to the `source` field of new events
    pub source: String,

    /// Timestamp stamped on new events
    pub time: DateTime<Utc>,

    root_user: Identity,
}

impl Ctx {
    /// Create a context from configuration, a request id and the current time
    pub fn new(config: &DomainConfig, request_id: Uuid, time: DateTime<Utc>) -> Self {
        Self {
            request_id,
            source: config.event_source.clone(),
            time,
            root_user: config.root_user.clone(),
        }
    }

    /// Override the event source for this request
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Identity that bypasses authorization
    pub fn root_user(&self) -> &Identity {
        &self.root_user
    }

    /// Whether the user is the root identity
    pub fn is_root(&self, user: &ServiceUser) -> bool {
        user.id == self.root_user
    }
}
