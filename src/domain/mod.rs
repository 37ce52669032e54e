// Copyright (c) 2025 - Cowboy AI, Inc.
//! Workflow Domain Value Objects
//!
//! - [`Identity`] - opaque user or group reference
//! - [`ServiceUser`] - acting identity plus its resolved group memberships
//! - [`ProjectId`], [`SubprojectId`], [`WorkflowitemId`] - aggregate ids
//! - [`Status`] - open/closed lifecycle shared by all aggregates
//! - [`AggregateKind`] - names an aggregate type in errors and logs

pub mod identity;
pub mod ids;
pub mod status;

pub use identity::{Identity, ServiceUser};
pub use ids::{ProjectId, SubprojectId, WorkflowitemId};
pub use status::{AggregateKind, Status};
