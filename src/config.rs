// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain configuration

use serde::{Deserialize, Serialize};

use crate::domain::Identity;
use crate::errors::ConfigError;

/// Environment variable naming the root identity
pub const ROOT_USER_VAR: &str = "WORKFLOW_ROOT_USER";

/// Environment variable naming the default event source
pub const EVENT_SOURCE_VAR: &str = "WORKFLOW_EVENT_SOURCE";

/// Configuration for the workflow domain core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Identity that bypasses every authorization check
    pub root_user: Identity,

    /// Provenance recorded in the `source` field of new events
    pub event_source: String,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            root_user: Identity::new("root"),
            event_source: "http".to_string(),
        }
    }
}

impl DomainConfig {
    /// Load configuration from the process environment
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root_user) = lookup(ROOT_USER_VAR) {
            if root_user.trim().is_empty() {
                return Err(ConfigError::Empty(ROOT_USER_VAR));
            }
            config.root_user = Identity::new(root_user.trim());
        }

        // An empty source is legal on events, so it is legal here too.
        if let Some(event_source) = lookup(EVENT_SOURCE_VAR) {
            config.event_source = event_source;
        }

        Ok(config)
    }

    /// Set the root identity
    pub fn with_root_user(mut self, root_user: impl Into<Identity>) -> Self {
        self.root_user = root_user.into();
        self
    }

    /// Set the event source
    pub fn with_event_source(mut self, event_source: impl Into<String>) -> Self {
        self.event_source = event_source.into();
        self
    }
}
