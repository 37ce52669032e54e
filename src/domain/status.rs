// Copyright (c) 2025 - Cowboy AI, Inc.
//! Aggregate lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status shared by projects, subprojects and workflow items
///
/// `Closed` is terminal. No event type reopens an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Closed,
}

impl Status {
    pub fn is_closed(&self) -> bool {
        matches!(self, Status::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Open => f.write_str("open"),
            Status::Closed => f.write_str("closed"),
        }
    }
}

/// Kind of aggregate, used in errors and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Project,
    Subproject,
    Workflowitem,
    GlobalPermissions,
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateKind::Project => "project",
            AggregateKind::Subproject => "subproject",
            AggregateKind::Workflowitem => "workflowitem",
            AggregateKind::GlobalPermissions => "global permissions",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_form() {
        assert_eq!(serde_json::to_string(&Status::Closed).unwrap(), r#""closed""#);
        assert_eq!(
            serde_json::from_str::<Status>(r#""open""#).unwrap(),
            Status::Open
        );
    }
}
