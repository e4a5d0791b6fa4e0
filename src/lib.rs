//! Structural metrics for expression syntax trees (ESTs)
//!
//! ESTs are JSON-encoded policy expressions recorded by fuzzing campaigns.
//! The core computes tree size, per-kind frequency maps, Shannon entropy and
//! k-path counts over a kind-label graph, and aggregates them per corpus.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::error::{EstMetricsError, Result};
