use thiserror::Error;

/// Main error type for est-metrics operations
#[derive(Error, Debug)]
pub enum EstMetricsError {
    #[error("Malformed EST node: {0}")]
    MalformedNode(String),

    #[error("Value node has no literal kind for payload {payload}")]
    UnresolvedKind { payload: String },

    #[error("Entropy requested over an empty distribution")]
    EmptyDistribution,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EstMetricsError>;
