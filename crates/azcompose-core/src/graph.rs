//! Dependency graph management using `petgraph`.
//!
//! Every declaration and component boundary is a node. Edges point from a
//! dependency to its dependent so that a topological sort yields
//! dependencies first, which is the order an engine provisions them in.

use std::collections::HashMap;
use std::fmt::Write as _;

use azcompose_common::error::{ComposeError, Result};
use azcompose_common::types::Urn;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// A dependency graph of declarations.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Urn, ()>,
    index: HashMap<Urn, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning the existing index if already present.
    pub fn add_node(&mut self, urn: &Urn) -> NodeIndex {
        if let Some(&idx) = self.index.get(urn) {
            return idx;
        }
        let idx = self.graph.add_node(urn.clone());
        let _ = self.index.insert(urn.clone(), idx);
        idx
    }

    /// Returns `true` if the node exists.
    #[must_use]
    pub fn contains(&self, urn: &Urn) -> bool {
        self.index.contains_key(urn)
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownResource`] if either node is missing.
    pub fn add_dependency(&mut self, dependent: &Urn, dependency: &Urn) -> Result<()> {
        let to = self.node(dependent)?;
        let from = self.node(dependency)?;
        if self.graph.find_edge(from, to).is_none() {
            let _ = self.graph.add_edge(from, to, ());
        }
        Ok(())
    }

    fn node(&self, urn: &Urn) -> Result<NodeIndex> {
        self.index
            .get(urn)
            .copied()
            .ok_or_else(|| ComposeError::UnknownResource {
                name: urn.to_string(),
            })
    }

    /// Returns a topological ordering, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::CyclicDependency`] if the graph has a cycle.
    pub fn resolve_order(&self) -> Result<Vec<Urn>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let at = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or_else(String::new, ToString::to_string);
                Err(ComposeError::CyclicDependency {
                    message: format!("declaration graph has a cycle through {at}"),
                })
            }
        }
    }

    /// Direct dependencies of a node.
    #[must_use]
    pub fn dependencies_of(&self, urn: &Urn) -> Vec<Urn> {
        self.neighbors(urn, Direction::Incoming)
    }

    /// Direct dependents of a node.
    #[must_use]
    pub fn dependents_of(&self, urn: &Urn) -> Vec<Urn> {
        self.neighbors(urn, Direction::Outgoing)
    }

    fn neighbors(&self, urn: &Urn, direction: Direction) -> Vec<Urn> {
        let Some(&idx) = self.index.get(urn) else {
            return Vec::new();
        };
        let mut out: Vec<Urn> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        out.sort();
        out
    }

    /// Nodes with no dependencies, sorted.
    #[must_use]
    pub fn roots(&self) -> Vec<Urn> {
        let mut out: Vec<Urn> = self
            .graph
            .externals(Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        out.sort();
        out
    }

    /// All edges as `(dependency, dependent)` pairs.
    #[must_use]
    pub fn edges(&self) -> Vec<(Urn, Urn)> {
        let mut edges: Vec<(Urn, Urn)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter_map(|(a, b)| Some((self.graph.node_weight(a)?.clone(), self.graph.node_weight(b)?.clone())))
            .collect();
        edges.sort();
        edges
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Renders the graph in Graphviz DOT format, labelling nodes with
    /// their logical names.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph composition {\n");
        for idx in self.graph.node_indices() {
            let urn = &self.graph[idx];
            let _ = writeln!(out, "  n{} [label=\"{}\"];", idx.index(), urn.name());
        }
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                let _ = writeln!(out, "  n{} -> n{};", a.index(), b.index());
            }
        }
        out.push_str("}\n");
        out
    }
}
