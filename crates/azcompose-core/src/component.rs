//! Component boundaries.
//!
//! A component groups a fixed sub-graph of declarations behind one logical
//! name with its own inputs and a fixed set of named outputs. Options given
//! to the boundary (protect, provider) are applied to every declaration
//! nested inside it, however deep.

use std::collections::BTreeMap;
use std::ops::Deref;

use azcompose_common::types::{ResourceName, TypeToken, Urn};
use serde_json::Value;

use crate::output::Output;
use crate::resource::{Handle, ResourceOptions};

/// The named outputs a component exposes.
pub trait ComponentOutputs {
    /// Output name and value pairs, registered on the boundary.
    fn outputs(&self) -> Vec<(&'static str, Output<Value>)>;
}

impl ComponentOutputs for () {
    fn outputs(&self) -> Vec<(&'static str, Output<Value>)> {
        Vec::new()
    }
}

/// A registered component boundary.
#[derive(Debug, Clone)]
pub struct ComponentBoundary {
    /// Unique identifier.
    pub urn: Urn,
    /// Logical name, prefixed by enclosing components.
    pub name: ResourceName,
    /// Component type token (`azc:web:Frontend`).
    pub type_token: TypeToken,
    /// Effective options, inherited by every child.
    pub options: ResourceOptions,
    /// Enclosing component, if any.
    pub parent: Option<Urn>,
    /// Direct children: declarations and nested components.
    pub children: Vec<Urn>,
    /// Registered outputs.
    pub outputs: BTreeMap<String, Output<Value>>,
}

impl ComponentBoundary {
    /// Names of the registered outputs.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

/// An open boundary while its children are being declared.
#[derive(Debug, Clone)]
pub(crate) struct ParentFrame {
    pub(crate) urn: Urn,
    pub(crate) name: ResourceName,
    pub(crate) options: ResourceOptions,
}

/// Handle to a component, dereferencing to its outputs.
#[derive(Debug, Clone)]
pub struct ComponentHandle<O> {
    urn: Urn,
    name: ResourceName,
    type_token: TypeToken,
    outputs: O,
}

impl<O> ComponentHandle<O> {
    pub(crate) const fn new(urn: Urn, name: ResourceName, type_token: TypeToken, outputs: O) -> Self {
        Self {
            urn,
            name,
            type_token,
            outputs,
        }
    }

    /// Logical name the component was registered with.
    pub const fn logical_name(&self) -> &ResourceName {
        &self.name
    }

    /// The component's outputs.
    pub const fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Consumes the handle, returning the outputs.
    pub fn into_outputs(self) -> O {
        self.outputs
    }
}

impl<O> Deref for ComponentHandle<O> {
    type Target = O;

    fn deref(&self) -> &O {
        &self.outputs
    }
}

impl<O> Handle for ComponentHandle<O> {
    fn urn(&self) -> &Urn {
        &self.urn
    }

    fn type_token(&self) -> &TypeToken {
        &self.type_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Site {
        url: Output<String>,
    }

    impl ComponentOutputs for Site {
        fn outputs(&self) -> Vec<(&'static str, Output<Value>)> {
            vec![("url", self.url.clone().into_value())]
        }
    }

    #[test]
    fn handle_derefs_to_outputs() {
        let token = TypeToken::new("azc:web:Site");
        let name = ResourceName::new("site");
        let handle = ComponentHandle::new(
            Urn::new("dev", "t", &token, &name),
            name,
            token,
            Site {
                url: Output::known("https://example.net".to_string()),
            },
        );
        assert!(!handle.url.is_secret());
        assert_eq!(handle.outputs().outputs().len(), 1);
        assert_eq!(handle.type_token().as_str(), "azc:web:Site");
    }

    #[test]
    fn unit_outputs_are_empty() {
        assert!(().outputs().is_empty());
    }
}
