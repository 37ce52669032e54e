// Copyright (c) 2025 - Cowboy AI, Inc.
//! Global Permission Events
//!
//! Audit records of changes to the organization-wide permission map. They
//! carry no enforcement logic: authorization reads the folded map, see
//! [`GlobalPermissions`](crate::aggregate::GlobalPermissions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_identity, EventSchema};
use crate::authz::GlobalIntent;
use crate::domain::Identity;
use crate::errors::{SchemaResult, SchemaViolation};

/// A global intent was granted to an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPermissionGranted {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,

    /// Who granted the permission
    pub publisher: Identity,

    pub permission: GlobalIntent,

    /// User or group receiving the permission
    pub grantee: Identity,
}

impl GlobalPermissionGranted {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        permission: GlobalIntent,
        grantee: Identity,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            permission,
            grantee,
        })
    }
}

impl EventSchema for GlobalPermissionGranted {
    const TYPE: &'static str = "global_permission_granted";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_identity("grantee", &self.grantee)
    }
}

business_event!(GlobalPermissionGranted);

/// A global intent was taken away from an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPermissionRevoked {
    pub source: String,
    #[serde(with = "super::time")]
    pub time: DateTime<Utc>,

    /// Who revoked the permission
    pub publisher: Identity,

    pub permission: GlobalIntent,

    /// User or group losing the permission
    pub revokee: Identity,
}

impl GlobalPermissionRevoked {
    pub fn create_event(
        source: impl Into<String>,
        publisher: Identity,
        permission: GlobalIntent,
        revokee: Identity,
        time: DateTime<Utc>,
    ) -> SchemaResult<Self> {
        Self::validated(Self {
            source: source.into(),
            time,
            publisher,
            permission,
            revokee,
        })
    }
}

impl EventSchema for GlobalPermissionRevoked {
    const TYPE: &'static str = "global_permission_revoked";

    fn check(&self) -> Result<(), SchemaViolation> {
        require_identity("publisher", &self.publisher)?;
        require_identity("revokee", &self.revokee)
    }
}

business_event!(GlobalPermissionRevoked);
