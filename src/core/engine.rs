// src/core/engine.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use super::{
    all_simple_paths_of_length, campaign_labels, discover_observation_files, to_graph,
    CategoryTable, CorpusAnalyzer, CorpusStats, EstNode, ExpressionMetrics, KindGraphSummary,
    TargetKind,
};

/// Metrics for a single EST document
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub metrics: ExpressionMetrics,
}

/// Kind graph of a single EST document and its k-paths
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub graph: KindGraphSummary,
    pub kpath_length: usize,
    pub kpaths: Vec<Vec<String>>,
    /// Graphviz rendering of the same graph
    #[serde(skip)]
    pub dot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Json,
    Dot,
}

/// Statistics for one observation file
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    /// Directory labels such as target, fuzzer, generator, repetition
    pub campaign: Vec<String>,
    pub path: PathBuf,
    pub target_kind: TargetKind,
    #[serde(flatten)]
    pub stats: CorpusStats,
}

/// Statistics for every observation file under a root
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub campaigns: Vec<CampaignReport>,
    /// Files that could not be read
    pub failed_files: Vec<PathBuf>,
}

/// Main orchestration engine for est-metrics
pub struct Engine {
    config: Config,
    categories: CategoryTable,
}

impl Engine {
    /// Create a new engine instance from a config file (or the defaults)
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let categories = config
            .category_table()
            .context("Invalid [categories] section")?;

        if !categories.is_empty() {
            debug!("Grouping kinds into {} categories", config.categories.len());
        }

        Ok(Self { config, categories })
    }

    /// Write a default configuration file, leaving an existing one alone
    pub async fn init(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let target_dir = match path {
            Some(dir) => dir,
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };
        let config_file = target_dir.join(DEFAULT_CONFIG_FILE);

        if config_file.exists() {
            warn!("{} already exists, leaving it unchanged", config_file.display());
            return Ok(config_file);
        }

        tokio::fs::create_dir_all(&target_dir)
            .await
            .with_context(|| format!("Failed to create {}", target_dir.display()))?;
        Config::default()
            .save(&config_file)
            .with_context(|| format!("Failed to write {}", config_file.display()))?;

        info!("Wrote default configuration to {}", config_file.display());
        Ok(config_file)
    }

    /// Size, category frequencies, entropy and k-path count of one EST file
    pub async fn analyze(&self, file: &Path, kpath_length: Option<usize>) -> Result<ExpressionReport> {
        let raw = self.read_est(file).await?;
        let k = kpath_length.unwrap_or(self.config.analysis.kpath_length);

        let metrics = ExpressionMetrics::compute(&raw, &self.categories, k)
            .with_context(|| format!("Failed to analyze {}", file.display()))?;

        info!("{}: {} subexpressions, {} {}-paths", file.display(), metrics.size, metrics.kpaths, k);

        Ok(ExpressionReport {
            source: file.to_path_buf(),
            metrics,
        })
    }

    /// Kind graph and k-paths of one EST file
    pub async fn graph(&self, file: &Path, kpath_length: Option<usize>) -> Result<GraphReport> {
        let raw = self.read_est(file).await?;
        let k = kpath_length.unwrap_or(self.config.analysis.kpath_length);

        let node = EstNode::new(&raw).with_context(|| format!("Malformed EST in {}", file.display()))?;
        let graph = to_graph(&node).with_context(|| format!("Malformed EST in {}", file.display()))?;

        let mut kpaths: Vec<Vec<String>> = graph
            .labels()
            .flat_map(|label| all_simple_paths_of_length(&graph, label, k))
            .map(|path| path.into_iter().map(str::to_string).collect())
            .collect();
        kpaths.sort();

        Ok(GraphReport {
            source: file.to_path_buf(),
            graph: graph.summary(),
            kpath_length: k,
            kpaths,
            dot: graph.to_dot(),
        })
    }

    /// Corpus statistics for an observation file or every observation file
    /// below a data directory
    pub async fn corpus(
        &self,
        path: &Path,
        target: Option<TargetKind>,
        kpath_length: Option<usize>,
    ) -> Result<CorpusReport> {
        let k = kpath_length.unwrap_or(self.config.analysis.kpath_length);
        let single_file = path.is_file();

        let files = if single_file {
            vec![path.to_path_buf()]
        } else {
            discover_observation_files(path, &self.config.corpus.observation_file)
                .with_context(|| format!("Failed to scan {}", path.display()))?
        };

        if files.is_empty() {
            warn!(
                "No {} files found under {}",
                self.config.corpus.observation_file,
                path.display()
            );
        } else {
            info!("Analyzing {} observation file(s) under {}", files.len(), path.display());
        }

        let analyzer = Arc::new(CorpusAnalyzer::new(&self.config)?.with_kpath_length(k));
        let mut tasks = JoinSet::new();

        for file in files {
            let campaign = if single_file {
                Vec::new()
            } else {
                campaign_labels(path, &file)
            };
            let target_kind = match target {
                Some(kind) => kind,
                None => file
                    .parent()
                    .and_then(TargetKind::from_dir)
                    .or_else(|| campaign.first().map(|name| TargetKind::infer(name)))
                    .with_context(|| {
                        format!("Cannot tell which target produced {}; pass --target", file.display())
                    })?,
            };

            let analyzer = Arc::clone(&analyzer);
            tasks.spawn_blocking(move || {
                let stats = analyzer.analyze_file(&file, target_kind);
                (file, campaign, target_kind, stats)
            });
        }

        let mut campaigns = Vec::new();
        let mut failed_files = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (file, campaign, target_kind, stats) = joined.context("Corpus analysis task failed")?;
            match stats {
                Ok(stats) => {
                    info!(
                        "{}: {} records, {} expressions ({} failed)",
                        file.display(),
                        stats.records,
                        stats.expressions,
                        stats.failed_expressions
                    );
                    campaigns.push(CampaignReport {
                        campaign,
                        path: file,
                        target_kind,
                        stats,
                    });
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    failed_files.push(file);
                }
            }
        }

        campaigns.sort_by(|a, b| a.path.cmp(&b.path));
        failed_files.sort();

        Ok(CorpusReport {
            generated_at: Utc::now(),
            root: path.to_path_buf(),
            campaigns,
            failed_files,
        })
    }

    /// Serialize a report according to the output settings
    pub fn render<T: Serialize>(&self, report: &T) -> Result<String> {
        let rendered = if self.config.output.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(rendered)
    }

    async fn read_est(&self, file: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file.display()))
    }
}
