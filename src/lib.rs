// Copyright (c) 2025 - Cowboy AI, Inc.
//! Workflow Domain Core
//!
//! Event-sourced business rules for a workflow-tracking backend: projects own
//! subprojects, subprojects own workflow items, and every state change is an
//! immutable business event appended to a log.
//!
//! # Pipeline
//!
//! ```text
//! Command → load (Repository) → preconditions → authorization
//!         → event construction (schema) → dry run (reducer)
//!         → derived notifications → { new_events, aggregate }
//! ```
//!
//! The crate never persists anything. Commands return the validated events in
//! append order and the caller hands them to its event store.
//!
//! # Modules
//!
//! - [`events`] - typed business events with schema validation
//! - [`authz`] - intents and the permission check
//! - [`aggregate`] - pure reducers folding events onto aggregate state
//! - [`commands`] - use-case orchestration (close project, ...)

pub mod aggregate;
pub mod authz;
pub mod commands;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod events;

// Re-export commonly used types
pub use config::DomainConfig;
pub use context::Ctx;
pub use domain::{Identity, ServiceUser, Status};
pub use errors::{CommandError, CommandResult, ErrorKind, SchemaError, ValidationFailure};
pub use commands::CommandOutput;
pub use events::BusinessEvent;
