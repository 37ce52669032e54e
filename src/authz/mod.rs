// Copyright (c) 2025 - Cowboy AI, Inc.
//! Intent-Based Authorization
//!
//! Every aggregate carries a permission map from intent to the identities
//! holding it. A user may perform an intent when its own id, or one of the
//! groups it belongs to, is listed under that intent.
//!
//! # Root
//!
//! The root identity bypasses authorization, but [`permits`] knows nothing
//! about it. Commands check root explicitly through
//! [`Ctx::is_root`](crate::Ctx::is_root) so the bypass is visible at the call
//! site:
//!
//! ```rust,ignore
//! if !ctx.is_root(issuer) && !project.permits(issuer, &[ProjectIntent::Close]) {
//!     return Err(CommandError::NotAuthorized { .. });
//! }
//! ```
//!
//! # Audit vs. enforcement
//!
//! Grant and revoke events are the audit trail. Decisions read the permission
//! map folded from them at decision time, never the log itself.

pub mod intents;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Identity, ServiceUser};

pub use intents::{
    GlobalIntent, Intent, ProjectIntent, SubprojectIntent, UnknownIntent, WorkflowitemIntent,
};

/// Permission map of one aggregate
///
/// Ordered collections keep serialization and replay deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound = "I: Intent")]
pub struct Permissions<I: Intent>(BTreeMap<I, BTreeSet<Identity>>);

impl<I: Intent> Default for Permissions<I> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<I: Intent> Permissions<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identities holding an intent
    pub fn holders(&self, intent: &I) -> Option<&BTreeSet<Identity>> {
        self.0.get(intent)
    }

    /// Whether an identity is listed under an intent
    pub fn is_granted(&self, intent: &I, identity: &Identity) -> bool {
        self.holders(intent)
            .is_some_and(|holders| holders.contains(identity))
    }

    /// Copy of this map with the identity added under the intent
    pub fn granted(&self, intent: I, identity: Identity) -> Self {
        let mut next = self.0.clone();
        next.entry(intent).or_default().insert(identity);
        Self(next)
    }

    /// Copy of this map with the identity removed from the intent
    ///
    /// Intents left without holders are dropped.
    pub fn revoked(&self, intent: &I, identity: &Identity) -> Self {
        let mut next = self.0.clone();
        if let Some(holders) = next.get_mut(intent) {
            holders.remove(identity);
            if holders.is_empty() {
                next.remove(intent);
            }
        }
        Self(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&I, &BTreeSet<Identity>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<I: Intent> FromIterator<(I, Identity)> for Permissions<I> {
    fn from_iter<T: IntoIterator<Item = (I, Identity)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |permissions, (intent, identity)| {
                permissions.granted(intent, identity)
            })
    }
}

/// Check whether a user holds at least one of the requested intents
///
/// The user matches through its own id or any of its groups. An empty
/// `intents` slice never permits anything.
pub fn permits<I: Intent>(permissions: &Permissions<I>, user: &ServiceUser, intents: &[I]) -> bool {
    intents.iter().any(|intent| {
        permissions
            .holders(intent)
            .is_some_and(|holders| user.identities().any(|id| holders.contains(id)))
    })
}
