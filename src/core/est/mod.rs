//! Expression syntax tree (EST) views
//!
//! An EST node is a JSON mapping with exactly one discriminant key. These
//! modules classify nodes and walk their children without copying the
//! underlying `serde_json::Value`.

mod node;
mod classifier;
mod walker;

pub use node::{discriminant_key, EstNode, Shape};
pub use classifier::{kind_of, CategoryTable, Kind, LiteralKind};
pub use walker::{children_of, subexpressions_of};
