// src/core/kind_graph/kind_graph.rs
use std::collections::HashMap;

use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::super::est::{children_of, EstNode};

/// Directed graph over kind labels.
///
/// Nodes are deduplicated by label, not by tree position, so a kind that
/// occurs both above and below itself in the tree becomes a cycle (a
/// self-loop in the simplest case). Consumers must not assume acyclicity.
#[derive(Debug, Clone, Default)]
pub struct KindGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

/// Serializable snapshot of a kind graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindGraphSummary {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl KindGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node for `label` unless one already exists
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.index.insert(label.to_string(), idx);
        idx
    }

    /// Add the edge `from -> to`; repeated edges collapse into one
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        self.graph.update_edge(a, b, ());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Labels reachable over one outgoing edge
    pub fn successors(&self, label: &str) -> Vec<&str> {
        let mut out: Vec<&str> = match self.index.get(label) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        };
        out.sort_unstable();
        out
    }

    /// Sorted node and edge lists, stable across runs
    pub fn summary(&self) -> KindGraphSummary {
        let mut nodes: Vec<String> = self.labels().map(str::to_string).collect();
        nodes.sort();

        let mut edges: Vec<(String, String)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].clone(), self.graph[b].clone()))
            .collect();
        edges.sort();

        KindGraphSummary { nodes, edges }
    }

    /// Graphviz rendering
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[DotConfig::EdgeNoLabel]))
    }

    pub(crate) fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.index.get(label).copied()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}

/// Build the kind graph of an EST.
///
/// Graph nodes are discriminant keys, not classified kinds, so every literal
/// collapses into a single `Value` node.
pub fn to_graph(node: &EstNode<'_>) -> Result<KindGraph> {
    let mut graph = KindGraph::new();
    let mut pending = vec![*node];

    while let Some(current) = pending.pop() {
        graph.add_node(current.key());
        for child in children_of(&current)? {
            graph.add_edge(current.key(), child.key());
            pending.push(child);
        }
    }

    Ok(graph)
}
