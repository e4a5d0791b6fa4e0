// src/core/kind_graph/mod.rs
//! Kind-label graphs and k-path statistics
//!
//! An EST is collapsed into a directed graph whose nodes are discriminant
//! keys. Counting the simple paths of a fixed length over that graph gives a
//! structural-diversity measure that is independent of tree size.

mod kind_graph;
mod path_enumerator;

pub use kind_graph::{to_graph, KindGraph, KindGraphSummary};
pub use path_enumerator::{
    all_simple_paths_of_length, count_all_simple_paths_of_length, count_simple_paths_of_length,
    k_path_count, DEFAULT_KPATH_LENGTH,
};
