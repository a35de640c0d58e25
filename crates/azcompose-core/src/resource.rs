//! Resource declarations, options, and handles.
//!
//! A [`ResourceKind`] is a typed builder for one provider resource type.
//! [`Stack::declare`](crate::stack::Stack::declare) turns it into a
//! [`ResourceDeclaration`] node and hands back a typed handle whose
//! attributes are [`Output`]s.

use std::collections::BTreeSet;

use azcompose_common::constants::PROVIDER_TYPE_PREFIX;
use azcompose_common::types::{ResourceName, TypeToken, Urn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::output::Output;
use crate::property::PropertyMap;

/// Whether the engine creates the object or only looks it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationMode {
    /// The engine creates, updates and deletes the object.
    Managed,
    /// Read-only lookup of an existing object (provider function).
    Read,
}

/// A typed builder for one provider resource type.
pub trait ResourceKind {
    /// Handle returned by a successful declaration.
    type Handle: From<Resource>;

    /// Provider type token (`azure-native:storage:StorageAccount`).
    const TYPE: &'static str;

    /// Dotted property paths the provider schema types as secret.
    const SECRET_INPUTS: &'static [&'static str] = &[];

    /// Attribute paths the provider reports as secret.
    const SECRET_OUTPUTS: &'static [&'static str] = &[];

    /// Managed resource or read-only lookup.
    const MODE: DeclarationMode = DeclarationMode::Managed;

    /// Lowers the builder into its property bag.
    fn into_properties(self) -> PropertyMap;
}

/// Anything that names a node in the declaration graph.
pub trait Handle {
    /// URN of the node.
    fn urn(&self) -> &Urn;

    /// Type token of the node.
    fn type_token(&self) -> &TypeToken;
}

/// Untyped handle to a declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    urn: Urn,
    name: ResourceName,
    type_token: TypeToken,
    secret_outputs: &'static [&'static str],
}

impl Resource {
    pub(crate) const fn new(
        urn: Urn,
        name: ResourceName,
        type_token: TypeToken,
        secret_outputs: &'static [&'static str],
    ) -> Self {
        Self {
            urn,
            name,
            type_token,
            secret_outputs,
        }
    }

    /// Logical name the resource was declared with.
    #[must_use]
    pub const fn logical_name(&self) -> &ResourceName {
        &self.name
    }

    /// A deferred attribute of the provisioned resource.
    ///
    /// The output is secret when the provider schema reports the attribute
    /// (or a parent of it) as secret.
    #[must_use]
    pub fn output<T>(&self, path: &str) -> Output<T>
    where
        T: DeserializeOwned + 'static,
    {
        let secret = self
            .secret_outputs
            .iter()
            .any(|s| path == *s || path.starts_with(&format!("{s}.")));
        Output::attribute(self.urn.clone(), path, secret)
    }

    /// Provider-assigned identifier.
    #[must_use]
    pub fn id(&self) -> Output<String> {
        self.output("id")
    }

    /// Physical name assigned at deployment time.
    #[must_use]
    pub fn name(&self) -> Output<String> {
        self.output("name")
    }
}

impl Handle for Resource {
    fn urn(&self) -> &Urn {
        &self.urn
    }

    fn type_token(&self) -> &TypeToken {
        &self.type_token
    }
}

/// Reference to an explicit provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    /// URN of the provider declaration.
    pub urn: Urn,
    /// Package the provider serves (`kubernetes`).
    pub package: String,
}

/// Deployment options attached to a declaration or component.
///
/// `protect` and `provider` cascade from a component to everything nested
/// inside it. The other options apply to the declaration they are given to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOptions {
    /// Refuse deletion until the flag is cleared.
    pub protect: bool,
    /// Explicit ordering dependencies.
    pub depends_on: Vec<Urn>,
    /// Explicit provider instance.
    pub provider: Option<ProviderRef>,
    /// Properties whose drift is ignored.
    pub ignore_changes: Vec<String>,
    /// Delete before creating a replacement.
    pub delete_before_replace: bool,
}

impl ResourceOptions {
    /// Options with every flag off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the protect flag.
    #[must_use]
    pub const fn protect(mut self, protect: bool) -> Self {
        self.protect = protect;
        self
    }

    /// Adds an explicit dependency.
    #[must_use]
    pub fn depends_on(mut self, handle: &impl Handle) -> Self {
        self.depends_on.push(handle.urn().clone());
        self
    }

    /// Uses an explicit provider instance for this declaration and its
    /// children of the same package.
    #[must_use]
    pub fn provider(mut self, handle: &impl Handle) -> Self {
        let package = handle
            .type_token()
            .as_str()
            .strip_prefix(PROVIDER_TYPE_PREFIX)
            .unwrap_or_else(|| handle.type_token().package())
            .to_string();
        self.provider = Some(ProviderRef {
            urn: handle.urn().clone(),
            package,
        });
        self
    }

    /// Adds a property whose drift is ignored.
    #[must_use]
    pub fn ignore_changes(mut self, property: impl Into<String>) -> Self {
        self.ignore_changes.push(property.into());
        self
    }

    /// Sets the delete-before-replace flag.
    #[must_use]
    pub const fn delete_before_replace(mut self, enabled: bool) -> Self {
        self.delete_before_replace = enabled;
        self
    }

    /// Effective options of a child of `parent` with type `type_token`.
    ///
    /// Flags are or-ed with the parent's, and the parent's dependencies and
    /// ignored properties are appended. The parent's provider is inherited
    /// when the child has none and belongs to the same package.
    #[must_use]
    pub fn inherit(mut self, parent: &Self, type_token: &TypeToken) -> Self {
        self.protect |= parent.protect;
        self.delete_before_replace |= parent.delete_before_replace;
        for urn in &parent.depends_on {
            if !self.depends_on.contains(urn) {
                self.depends_on.push(urn.clone());
            }
        }
        for property in &parent.ignore_changes {
            if !self.ignore_changes.contains(property) {
                self.ignore_changes.push(property.clone());
            }
        }
        if self.provider.is_none() {
            self.provider = parent
                .provider
                .clone()
                .filter(|p| p.package == type_token.package());
        }
        self
    }
}

/// A node in the declaration graph.
#[derive(Debug, Clone)]
pub struct ResourceDeclaration {
    /// Unique identifier.
    pub urn: Urn,
    /// Logical name, prefixed by enclosing components.
    pub name: ResourceName,
    /// Provider type token.
    pub type_token: TypeToken,
    /// Managed resource or lookup.
    pub mode: DeclarationMode,
    /// Unresolved properties.
    pub properties: PropertyMap,
    /// Effective options after inheritance.
    pub options: ResourceOptions,
    /// Enclosing component, if any.
    pub parent: Option<Urn>,
    /// Every node this declaration must wait for.
    pub dependencies: BTreeSet<Urn>,
}
