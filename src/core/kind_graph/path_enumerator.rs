// src/core/kind_graph/path_enumerator.rs
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::Result;
use super::super::est::EstNode;
use super::kind_graph::{to_graph, KindGraph};

/// Path length used when none is configured
pub const DEFAULT_KPATH_LENGTH: usize = 2;

/// All simple paths of exactly `k` edges starting at `start`.
///
/// A node never appears twice within one path. Kind graphs can be cyclic,
/// so this rule is what makes the search terminate. An unknown `start`
/// yields no paths.
pub fn all_simple_paths_of_length<'g>(graph: &'g KindGraph, start: &str, k: usize) -> Vec<Vec<&'g str>> {
    let mut paths = Vec::new();

    if let Some(start) = graph.index_of(start) {
        let inner = graph.inner();
        extend_paths(inner, start, k, &mut vec![start], &mut |path| {
            paths.push(path.iter().map(|&idx| inner[idx].as_str()).collect());
        });
    }

    paths
}

/// Number of simple paths of exactly `k` edges starting at `start`
pub fn count_simple_paths_of_length(graph: &KindGraph, start: &str, k: usize) -> usize {
    match graph.index_of(start) {
        Some(start) => count_from(graph.inner(), start, k),
        None => 0,
    }
}

/// Simple paths of length `k` summed over every start node of the graph
pub fn count_all_simple_paths_of_length(graph: &KindGraph, k: usize) -> usize {
    let inner = graph.inner();
    inner
        .node_indices()
        .map(|start| count_from(inner, start, k))
        .sum()
}

/// k-path count of an EST: every simple path of `k` edges in its kind
/// graph, from any start node rather than only the root.
pub fn k_path_count(node: &EstNode<'_>, k: usize) -> Result<usize> {
    let graph = to_graph(node)?;
    Ok(count_all_simple_paths_of_length(&graph, k))
}

fn count_from(graph: &DiGraph<String, ()>, start: NodeIndex, k: usize) -> usize {
    let mut count = 0;
    extend_paths(graph, start, k, &mut vec![start], &mut |_| count += 1);
    count
}

fn extend_paths<F>(
    graph: &DiGraph<String, ()>,
    current: NodeIndex,
    remaining: usize,
    path: &mut Vec<NodeIndex>,
    visit: &mut F,
) where
    F: FnMut(&[NodeIndex]),
{
    if remaining == 0 {
        visit(path.as_slice());
        return;
    }

    for next in graph.neighbors_directed(current, Direction::Outgoing) {
        if path.contains(&next) {
            continue;
        }
        path.push(next);
        extend_paths(graph, next, remaining - 1, path, visit);
        path.pop();
    }
}
