//! Dependency graph export for visualization and tooling.
//!
//! Two views of the registry are available: a Graphviz `dot` string for quick
//! inspection, and a structured [`DependencyGraph`] that can be serialized to
//! JSON with the `graph-export` feature.

use std::fmt::Write as _;

#[cfg(feature = "graph-export")]
use serde::Serialize;

use crate::container::Servant;
use crate::error::{ServantError, ServantResult};
use crate::lifestyle::Lifestyle;

/// A declared type with a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct GraphNode {
    pub type_name: &'static str,
    pub lifestyle: Lifestyle,
    /// Whether a singleton instance has already been created.
    pub realized: bool,
}

/// `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct GraphEdge {
    pub from: &'static str,
    pub to: &'static str,
}

/// Snapshot of the registry's dependency graph.
///
/// Nodes follow registration order, edges follow parameter order. Types that
/// are depended upon but have no provider appear as edge targets only, and are
/// listed in `unregistered`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub unregistered: Vec<&'static str>,
}

impl DependencyGraph {
    /// Whether every edge target has a provider.
    pub fn is_complete(&self) -> bool {
        self.unregistered.is_empty()
    }

    /// Dependencies of `type_name`, in parameter order.
    pub fn dependencies_of(&self, type_name: &str) -> Vec<&'static str> {
        self.edges
            .iter()
            .filter(|e| e.from == type_name)
            .map(|e| e.to)
            .collect()
    }

    /// Renders the graph in Graphviz `dot` syntax.
    ///
    /// Each declared type gets one line listing its dependencies; a type
    /// without dependencies is emitted as a bare node.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph servant {\n");
        for node in &self.nodes {
            let dependencies = self.dependencies_of(node.type_name);
            if dependencies.is_empty() {
                let _ = writeln!(out, "  \"{}\";", node.type_name);
            } else {
                let targets: Vec<String> = dependencies.iter().map(|d| format!("\"{}\"", d)).collect();
                let _ = writeln!(out, "  \"{}\" -> {{ {} }};", node.type_name, targets.join(" "));
            }
        }
        out.push_str("}\n");
        out
    }

    #[cfg(feature = "graph-export")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Servant {
    /// Builds the structured dependency graph.
    ///
    /// Fails only when the container has been disposed; an incomplete graph
    /// is reported through [`DependencyGraph::unregistered`].
    pub fn dependency_graph(&self) -> ServantResult<DependencyGraph> {
        self.ensure_live()?;

        let mut graph = DependencyGraph::default();
        self.for_each_entry(|entry| match entry.provider() {
            Some(provider) => {
                graph.nodes.push(GraphNode {
                    type_name: entry.key().name(),
                    lifestyle: provider.lifestyle(),
                    realized: provider.is_realized(),
                });
                graph.edges.extend(provider.dependencies().iter().map(|dependency| GraphEdge {
                    from: entry.key().name(),
                    to: dependency.key().name(),
                }));
            }
            None => graph.unregistered.push(entry.key().name()),
        });
        Ok(graph)
    }

    /// Renders the dependency graph in Graphviz `dot` syntax.
    ///
    /// Fails with [`ServantError::IncompleteGraph`] if any known type lacks a
    /// provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use servant::Servant;
    /// use std::sync::Arc;
    ///
    /// struct Config;
    /// struct Repository { config: Arc<Config> }
    ///
    /// let servant = Servant::new();
    /// servant.add_singleton(|| Arc::new(Config)).unwrap();
    /// servant.add_transient(|config: Arc<Config>| Arc::new(Repository { config })).unwrap();
    ///
    /// let dot = servant.to_dot_graph_string().unwrap();
    /// assert!(dot.starts_with("digraph servant {"));
    /// assert!(dot.contains("Repository\" -> {"));
    /// ```
    pub fn to_dot_graph_string(&self) -> ServantResult<String> {
        let graph = self.dependency_graph()?;
        if !graph.is_complete() {
            return Err(ServantError::IncompleteGraph(graph.unregistered));
        }
        Ok(graph.to_dot())
    }
}
