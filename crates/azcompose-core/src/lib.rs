//! # azcompose-core
//!
//! The resource-composition layer. A program reads configuration, declares
//! resources whose properties may reference other resources' future
//! outputs, optionally groups declarations behind component boundaries,
//! and exports named values. The result is a validated [`Composition`]:
//! a dependency graph plus an export registry, ready to be handed to an
//! orchestration engine.
//!
//! Handles:
//! - **Config**: typed, secret-aware reads of stack configuration.
//! - **Output**: deferred values with `map`/`combine` transformations.
//! - **Resource**: typed declarations and their options.
//! - **Component**: named boundaries whose options cascade to children.
//! - **Export**: the stack's published values.
//! - **Graph**: dependency ordering and cycle detection.
//! - **Simulate**: an in-process engine double for tests and previews.
//!
//! [`Composition`]: stack::Composition

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod asset;
pub mod component;
pub mod config;
pub mod export;
pub mod graph;
pub mod output;
pub mod property;
pub mod resource;
pub mod secret;
pub mod simulate;
pub mod stack;
pub mod validator;

pub use component::{ComponentHandle, ComponentOutputs};
pub use config::Config;
pub use export::{ExportKind, ExportValue};
pub use output::{Input, Output};
pub use property::{PropertyMap, PropertyValue};
pub use resource::{Handle, Resource, ResourceKind, ResourceOptions};
pub use secret::Secret;
pub use stack::{Composition, Stack};
