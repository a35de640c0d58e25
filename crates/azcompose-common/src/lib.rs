//! # azcompose-common
//!
//! Shared error definitions, identifier types, stack settings, and
//! constants used across the azcompose workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives the composition layer and
//! the Azure schema crate build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
