//! `azc graph`: Print the dependency graph of a program.

use std::fmt::Write as _;

use azcompose_common::types::Urn;
use azcompose_core::Composition;
use clap::Args;

use super::StackSource;
use crate::output;

/// Arguments for the `graph` command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Built-in program to compose.
    pub program: String,

    /// Emit Graphviz DOT instead of an edge list.
    #[arg(long)]
    pub dot: bool,
}

/// Executes the `graph` command.
///
/// # Errors
///
/// Returns an error if composition fails.
pub fn execute(source: &StackSource, args: &GraphArgs) -> anyhow::Result<()> {
    let composition = super::compose(source, &args.program)?;
    if args.dot {
        output::emit(&composition.graph().to_dot());
    } else {
        output::emit(&edge_list(&composition));
    }
    Ok(())
}

/// One `dependency -> dependent` line per edge, then the roots.
pub(crate) fn edge_list(composition: &Composition) -> String {
    let graph = composition.graph();
    let mut out = String::new();
    for (dependency, dependent) in graph.edges() {
        let _ = writeln!(out, "{} -> {}", dependency.name(), dependent.name());
    }
    let roots = graph.roots();
    let names: Vec<String> = roots.iter().map(Urn::name).collect();
    let _ = writeln!(
        out,
        "\n{} node(s), roots: {}",
        graph.node_count(),
        names.join(", ")
    );
    out
}

#[cfg(test)]
mod tests {
    use azcompose_azure::programs::find;
    use azcompose_common::config::StackSettings;
    use azcompose_core::Stack;

    use super::*;

    #[test]
    fn edges_point_from_dependency_to_dependent() {
        let settings = StackSettings::new("stack-basics", "dev").with_value("base_name", "shop");
        let composition = Stack::run(settings, find("stack-basics").unwrap().run).unwrap();
        let text = edge_list(&composition);
        assert!(text.contains("1 node(s), roots: shop-rg"), "{text}");
    }

    #[test]
    fn component_children_hang_off_the_component() {
        let settings = StackSettings::new("webserver", "dev");
        let composition = Stack::run(settings, find("webserver").unwrap().run).unwrap();
        let text = edge_list(&composition);
        assert!(text.lines().any(|l| l == "network -> network-vnet"), "{text}");
        assert!(text.lines().any(|l| l == "network-nic -> server-vm"));
    }
}
