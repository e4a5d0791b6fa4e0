use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::{CategoryTable, DEFAULT_KPATH_LENGTH};
use crate::error::{EstMetricsError, Result};

/// File name written by `init` and searched first by `load_or_default`
pub const DEFAULT_CONFIG_FILE: &str = "est-metrics.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metric settings
    pub analysis: AnalysisConfig,

    /// Category label -> kind labels grouped under it
    pub categories: BTreeMap<String, Vec<String>>,

    /// Observation corpus settings
    pub corpus: CorpusConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of edges in each counted k-path
    pub kpath_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Status an observation must carry to be analyzed
    pub passed_status: String,

    /// Observation file name searched for in data directories
    pub observation_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kpath_length: DEFAULT_KPATH_LENGTH,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            passed_status: "passed".to_string(),
            observation_file: "obs.jsonl".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| EstMetricsError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EstMetricsError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = [DEFAULT_CONFIG_FILE, "EstMetrics.toml", ".est-metrics.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Category table described by the `[categories]` section
    pub fn category_table(&self) -> Result<CategoryTable> {
        CategoryTable::from_groups(
            self.categories
                .iter()
                .map(|(category, kinds)| (category.clone(), kinds.iter().cloned())),
        )
    }
}
