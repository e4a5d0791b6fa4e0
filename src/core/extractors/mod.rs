//! Expression extractors for fuzzing-target representations
//!
//! Each fuzzing target serializes its inputs differently. An extractor pulls
//! the EST expressions out of one decoded representation so the metric
//! calculators never need to know which target produced it.

mod eval;
mod policy;

pub use eval::EvalExtractor;
pub use policy::PolicyExtractor;

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Trait that all representation extractors must implement
pub trait ExpressionExtractor: Send + Sync {
    /// Borrow every EST expression held by a decoded representation
    fn extract<'a>(&self, representation: &'a Value) -> Result<Vec<&'a Value>>;

    /// The target kind this extractor handles
    fn target_kind(&self) -> TargetKind;
}

/// Fuzzing targets whose observation directories are recognized by name
pub const KNOWN_TARGETS: &[&str] = &[
    "abac_type_directed",
    "eval_type_directed",
    "validation_drt_type_directed",
    "convert_policy_est_to_cedar_type_directed",
];

/// Shape of the representations a fuzzing target records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A single `expression`
    Eval,
    /// A `policy` whose `conditions` carry expression bodies
    Policy,
}

impl TargetKind {
    /// Infer from a target name such as `eval_type_directed`
    pub fn infer(target_name: &str) -> Self {
        if target_name.contains("eval") {
            TargetKind::Eval
        } else {
            TargetKind::Policy
        }
    }

    /// Kind of the nearest directory in `dir` named after a known target.
    /// Other directory names are ignored.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        dir.components()
            .rev()
            .filter_map(|c| c.as_os_str().to_str())
            .find(|name| KNOWN_TARGETS.contains(name))
            .map(Self::infer)
    }

    pub fn extractor(&self) -> Box<dyn ExpressionExtractor> {
        match self {
            TargetKind::Eval => Box::new(EvalExtractor),
            TargetKind::Policy => Box::new(PolicyExtractor),
        }
    }
}
