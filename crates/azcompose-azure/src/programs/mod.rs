//! Built-in composition programs.
//!
//! Each program is a plain function over a [`Stack`]: it reads its
//! configuration, declares its resources, and registers its exports.

pub mod aks_apache;
pub mod stack_basics;
pub mod static_website;
pub mod webserver;

use azcompose_common::error::Result;
use azcompose_core::{ResourceOptions, Stack};

use crate::resources::{ResourceGroup, ResourceGroupArgs};

/// Namespace the Azure provider reads its own settings from.
pub const AZURE_NAMESPACE: &str = "azure-native";

/// A named program.
#[derive(Debug, Clone, Copy)]
pub struct Program {
    /// Name used on the command line.
    pub name: &'static str,
    /// Default project name.
    pub project: &'static str,
    /// One-line summary.
    pub description: &'static str,
    /// Composition entry point.
    pub run: fn(&mut Stack) -> Result<()>,
}

const CATALOG: &[Program] = &[
    Program {
        name: "stack-basics",
        project: "stack-basics",
        description: "Resource group named from required config, exported as a stack output",
        run: stack_basics::run,
    },
    Program {
        name: "aks-apache",
        project: "aks-apache",
        description: "AKS cluster with a generated service principal and an Apache Helm chart",
        run: aks_apache::run,
    },
    Program {
        name: "static-website",
        project: "static-website",
        description: "Storage account static website behind a protected CDN frontend component",
        run: static_website::run,
    },
    Program {
        name: "webserver",
        project: "webserver",
        description: "Linux VM on a protected server-network component with a secret admin password",
        run: webserver::run,
    },
];

/// Every built-in program.
#[must_use]
pub const fn catalog() -> &'static [Program] {
    CATALOG
}

/// Looks up a program by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static Program> {
    CATALOG.iter().find(|p| p.name == name)
}

/// Declares a resource group, placed in `azure-native:location` when that
/// key is configured.
pub(crate) fn resource_group(stack: &mut Stack, name: &str) -> Result<ResourceGroup> {
    let location = stack.config_namespace(AZURE_NAMESPACE).get("location")?;
    let mut args = ResourceGroupArgs::new();
    match location {
        Some(location) => {
            tracing::debug!(resource_group = name, %location, "placing resource group");
            args = args.location(location);
        }
        None => tracing::debug!(resource_group = name, "no location configured, provider default applies"),
    }
    stack.declare(name, args, ResourceOptions::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
    }

    #[test]
    fn find_returns_known_programs() {
        assert!(find("webserver").is_some());
        assert!(find("missing").is_none());
    }
}
