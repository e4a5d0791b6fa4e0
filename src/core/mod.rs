mod engine;
mod metrics;
mod corpus;

// EST classification and traversal
pub mod est;

// Kind-label graph and k-path enumeration
pub mod kind_graph;

// Per-target expression extraction
pub mod extractors;

pub use est::{
    children_of, discriminant_key, kind_of, subexpressions_of, CategoryTable, EstNode, Kind,
    LiteralKind, Shape,
};
pub use kind_graph::{
    all_simple_paths_of_length, count_all_simple_paths_of_length, count_simple_paths_of_length,
    k_path_count, to_graph, KindGraph, KindGraphSummary, DEFAULT_KPATH_LENGTH,
};
pub use metrics::{
    category_frequency_map, entropy_of_weights, normalized_entropy, size_of, CorpusAccumulator,
    ExpressionMetrics, FrequencyMap,
};
pub use corpus::{campaign_labels, discover_observation_files, CorpusAnalyzer, CorpusStats, Observation};
pub use extractors::{EvalExtractor, ExpressionExtractor, PolicyExtractor, TargetKind};

// Export the main engine
pub use engine::{CampaignReport, CorpusReport, Engine, ExpressionReport, GraphFormat, GraphReport};
