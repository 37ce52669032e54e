// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a user or a group
///
/// No existence check happens here; the repository owns identity lookup.
/// Emptiness is rejected by event schema validation, not at construction,
/// so payloads read from the log can still be inspected and reported.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The identity issuing a command
///
/// `groups` holds every group the user is a transitive member of, as resolved
/// by the identity layer before the command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUser {
    pub id: Identity,
    #[serde(default)]
    pub groups: Vec<Identity>,
}

impl ServiceUser {
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_groups<I, T>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identity>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// The user's own id followed by its group ids
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        std::iter::once(&self.id).chain(self.groups.iter())
    }
}
