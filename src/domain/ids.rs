// Copyright (c) 2025 - Cowboy AI, Inc.
//! Aggregate identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! aggregate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

aggregate_id!(
    /// Project aggregate id
    ProjectId
);

aggregate_id!(
    /// Subproject aggregate id, unique within its project
    SubprojectId
);

aggregate_id!(
    /// Workflow item aggregate id, unique within its subproject
    WorkflowitemId
);
