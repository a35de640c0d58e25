//! Whole-composition validation.
//!
//! Runs once when a [`Stack`](crate::stack::Stack) is finished, before
//! anything reaches an engine. Most rules are already enforced at
//! declaration time; this pass checks the assembled graph as a whole.

use std::collections::HashSet;

use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::Urn;

use crate::stack::Composition;

/// Validates a composition.
///
/// # Checks performed
///
/// 1. URNs are unique across resources and components.
/// 2. Every dependency, parent, child, and export reference names a node
///    of this composition.
/// 3. The dependency graph is acyclic.
/// 4. Exports not marked secret carry no secret value.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(composition: &Composition) -> Result<()> {
    tracing::debug!("validating composition");
    check_unique_urns(composition)?;
    check_references(composition)?;
    let _ = composition.graph().resolve_order()?;
    check_export_secrecy(composition)?;
    Ok(())
}

fn check_unique_urns(composition: &Composition) -> Result<()> {
    let mut seen = HashSet::new();
    let resources = composition
        .declarations()
        .iter()
        .map(|d| ("resource", &d.urn));
    let components = composition
        .components()
        .iter()
        .map(|c| ("component", &c.urn));
    for (kind, urn) in resources.chain(components) {
        if !seen.insert(urn) {
            return Err(ComposeError::NameCollision {
                kind,
                name: urn.name(),
            });
        }
    }
    Ok(())
}

fn check_references(composition: &Composition) -> Result<()> {
    let known: HashSet<&Urn> = composition
        .declarations()
        .iter()
        .map(|d| &d.urn)
        .chain(composition.components().iter().map(|c| &c.urn))
        .collect();
    let ensure = |urn: &Urn| {
        if known.contains(urn) {
            Ok(())
        } else {
            Err(ComposeError::UnknownResource {
                name: urn.to_string(),
            })
        }
    };

    for decl in composition.declarations() {
        decl.dependencies.iter().try_for_each(ensure)?;
        decl.parent.iter().try_for_each(ensure)?;
    }
    for component in composition.components() {
        component.children.iter().try_for_each(ensure)?;
        component.parent.iter().try_for_each(ensure)?;
        for output in component.outputs.values() {
            output.dependencies().iter().try_for_each(ensure)?;
        }
    }
    for record in composition.exports().iter() {
        record.dependencies().iter().try_for_each(ensure)?;
    }
    Ok(())
}

fn check_export_secrecy(composition: &Composition) -> Result<()> {
    for record in composition.exports().iter() {
        if !record.secret && record.value().is_secret() {
            return Err(ComposeError::secret_leak(format!(
                "export \"{}\" carries a secret value but is not marked secret",
                record.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use azcompose_common::config::StackSettings;
    use azcompose_common::types::{ResourceName, TypeToken};

    use super::*;
    use crate::export::ExportRegistry;
    use crate::graph::DependencyGraph;
    use crate::property::PropertyMap;
    use crate::resource::{DeclarationMode, ResourceDeclaration, ResourceOptions};

    fn urn(name: &str) -> Urn {
        Urn::new("dev", "t", &TypeToken::new("t:m:K"), &ResourceName::new(name))
    }

    fn decl(name: &str, deps: &[&str]) -> ResourceDeclaration {
        ResourceDeclaration {
            urn: urn(name),
            name: ResourceName::new(name),
            type_token: TypeToken::new("t:m:K"),
            mode: DeclarationMode::Managed,
            properties: PropertyMap::new(),
            options: ResourceOptions::new(),
            parent: None,
            dependencies: deps.iter().map(|d| urn(d)).collect::<BTreeSet<_>>(),
        }
    }

    fn composition(declarations: Vec<ResourceDeclaration>) -> Composition {
        let mut graph = DependencyGraph::new();
        for d in &declarations {
            let _ = graph.add_node(&d.urn);
        }
        for d in &declarations {
            for dep in &d.dependencies {
                if graph.contains(dep) {
                    graph.add_dependency(&d.urn, dep).unwrap();
                }
            }
        }
        Composition {
            settings: StackSettings::new("t", "dev"),
            declarations,
            components: Vec::new(),
            exports: ExportRegistry::new(),
            graph,
            config_reads: Vec::new(),
        }
    }

    #[test]
    fn validate_empty_composition_succeeds() {
        assert!(validate(&composition(Vec::new())).is_ok());
    }

    #[test]
    fn validate_chain_succeeds() {
        let c = composition(vec![decl("rg", &[]), decl("sa", &["rg"])]);
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn validate_duplicate_urn_fails() {
        let c = composition(vec![decl("rg", &[]), decl("rg", &[])]);
        let err = validate(&c).unwrap_err();
        assert!(matches!(err, ComposeError::NameCollision { .. }), "got: {err}");
    }

    #[test]
    fn validate_dangling_dependency_fails() {
        let c = composition(vec![decl("sa", &["ghost"])]);
        let err = validate(&c).unwrap_err();
        assert!(err.to_string().contains("ghost"), "got: {err}");
    }

    #[test]
    fn validate_cycle_fails() {
        let c = composition(vec![decl("a", &["b"]), decl("b", &["a"])]);
        let err = validate(&c).unwrap_err();
        assert!(matches!(err, ComposeError::CyclicDependency { .. }), "got: {err}");
    }
}
