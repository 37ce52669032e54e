// Copyright (c) 2025 - Cowboy AI, Inc.
//! Intent Enumerations
//!
//! Each aggregate kind has its own closed set of intents. The sets are
//! disjoint: a project intent can never appear in a global permission map and
//! the type system enforces it. The wire form of every intent is its dotted
//! name, e.g. `project.close`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// Intent string that is not part of the expected enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a {scope} intent")]
pub struct UnknownIntent {
    pub scope: &'static str,
    pub value: String,
}

/// A capability token checked against a permission map
pub trait Intent:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + 'static
{
    /// Every member of the enumeration
    const ALL: &'static [Self];

    /// Name of the enumeration, used in error messages
    const SCOPE: &'static str;

    /// Dotted wire name
    fn as_str(&self) -> &'static str;

    /// Look up an intent by its dotted wire name
    fn parse(value: &str) -> Result<Self, UnknownIntent> {
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == value)
            .ok_or_else(|| UnknownIntent {
                scope: Self::SCOPE,
                value: value.to_string(),
            })
    }
}

macro_rules! intents {
    (
        $(#[$meta:meta])*
        $name:ident, $scope:literal {
            $( $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Intent for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];
            const SCOPE: &'static str = $scope;

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownIntent;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <Self as Intent>::parse(value)
            }
        }
    };
}

intents!(
    /// Organization-wide intents, held in the global permission map
    GlobalIntent, "global" {
        ListPermissions => "global.listPermissions",
        GrantPermission => "global.grantPermission",
        GrantAllPermissions => "global.grantAllPermissions",
        RevokePermission => "global.revokePermission",
        CreateProject => "global.createProject",
        CreateUser => "global.createUser",
        EnableUser => "global.enableUser",
        DisableUser => "global.disableUser",
        ListAssignments => "global.listAssignments",
        CreateGroup => "global.createGroup",
    }
);

intents!(
    /// Intents held in a project's permission map
    ProjectIntent, "project" {
        ListPermissions => "project.intent.listPermissions",
        GrantPermission => "project.intent.grantPermission",
        RevokePermission => "project.intent.revokePermission",
        ViewSummary => "project.viewSummary",
        ViewDetails => "project.viewDetails",
        Assign => "project.assign",
        Update => "project.update",
        Close => "project.close",
        CreateSubproject => "project.createSubproject",
    }
);

intents!(
    /// Intents held in a subproject's permission map
    SubprojectIntent, "subproject" {
        ListPermissions => "subproject.intent.listPermissions",
        GrantPermission => "subproject.intent.grantPermission",
        RevokePermission => "subproject.intent.revokePermission",
        ViewSummary => "subproject.viewSummary",
        ViewDetails => "subproject.viewDetails",
        Assign => "subproject.assign",
        Update => "subproject.update",
        Close => "subproject.close",
        CreateWorkflowitem => "subproject.createWorkflowitem",
    }
);

intents!(
    /// Intents held in a workflow item's permission map
    WorkflowitemIntent, "workflowitem" {
        ListPermissions => "workflowitem.intent.listPermissions",
        GrantPermission => "workflowitem.intent.grantPermission",
        RevokePermission => "workflowitem.intent.revokePermission",
        View => "workflowitem.view",
        Assign => "workflowitem.assign",
        Update => "workflowitem.update",
        Close => "workflowitem.close",
    }
);
