// src/core/corpus.rs
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{EstMetricsError, Result};
use super::est::CategoryTable;
use super::extractors::{ExpressionExtractor, TargetKind};
use super::metrics::{CorpusAccumulator, ExpressionMetrics};

/// One line of an observation log
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub status: Option<String>,

    /// JSON text of the fuzzer input
    #[serde(default)]
    pub representation: Option<String>,
}

/// Aggregate metrics over one observation corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Passed observations with a representation
    pub records: usize,
    /// Undecodable lines, plus passed observations whose representation
    /// could not be decoded or held no expressions
    pub failed_records: usize,
    /// Distinct representations as a percentage of `records`
    pub unique_pct: Option<f64>,
    /// Expressions analyzed successfully
    pub expressions: usize,
    /// Expressions rejected as malformed or unclassifiable
    pub failed_expressions: usize,
    pub kpath_length: usize,
    pub mean_est_size: Option<f64>,
    /// Entropy of the mean category distribution
    pub entropy: Option<f64>,
    pub mean_kpaths: Option<f64>,
    pub category_means: BTreeMap<String, f64>,
}

/// Computes corpus statistics from observation logs
#[derive(Debug, Clone)]
pub struct CorpusAnalyzer {
    categories: CategoryTable,
    kpath_length: usize,
    passed_status: String,
}

impl CorpusAnalyzer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            categories: config.category_table()?,
            kpath_length: config.analysis.kpath_length,
            passed_status: config.corpus.passed_status.clone(),
        })
    }

    pub fn with_kpath_length(mut self, kpath_length: usize) -> Self {
        self.kpath_length = kpath_length;
        self
    }

    /// Read and analyze one observation file
    pub fn analyze_file(&self, path: &Path, target: TargetKind) -> Result<CorpusStats> {
        let content = std::fs::read_to_string(path)?;
        debug!("Analyzing {} as a {:?} corpus", path.display(), target);
        Ok(self.analyze_observations(&content, target.extractor().as_ref()))
    }

    /// Analyze JSON-lines observation content.
    ///
    /// Bad lines and bad expressions are counted and logged; they never
    /// abort the rest of the corpus.
    pub fn analyze_observations(&self, content: &str, extractor: &dyn ExpressionExtractor) -> CorpusStats {
        let mut accumulator = CorpusAccumulator::new();
        let mut digests = HashSet::new();
        let mut records = 0;
        let mut failed_records = 0;
        let mut failed_expressions = 0;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let observation: Observation = match serde_json::from_str(line) {
                Ok(observation) => observation,
                Err(e) => {
                    warn!("Skipping undecodable observation on line {}: {}", line_no + 1, e);
                    failed_records += 1;
                    continue;
                }
            };

            if observation.status.as_deref() != Some(self.passed_status.as_str()) {
                continue;
            }
            let representation = match observation.representation.as_deref() {
                Some(text) if !text.is_empty() => text,
                _ => continue,
            };

            records += 1;
            digests.insert(Sha256::digest(representation.as_bytes()));

            let decoded: Value = match serde_json::from_str(representation) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Line {}: representation is not JSON: {}", line_no + 1, e);
                    failed_records += 1;
                    continue;
                }
            };

            let expressions = match extractor.extract(&decoded) {
                Ok(expressions) => expressions,
                Err(e) => {
                    warn!("Line {}: {}", line_no + 1, e);
                    failed_records += 1;
                    continue;
                }
            };

            for expression in expressions {
                match ExpressionMetrics::compute(expression, &self.categories, self.kpath_length) {
                    Ok(metrics) => accumulator.add(&metrics),
                    Err(e) => {
                        warn!("Line {}: skipping expression: {}", line_no + 1, e);
                        failed_expressions += 1;
                    }
                }
            }
        }

        let unique_pct = (records > 0).then(|| digests.len() as f64 / records as f64 * 100.0);

        CorpusStats {
            records,
            failed_records,
            unique_pct,
            expressions: accumulator.items(),
            failed_expressions,
            kpath_length: self.kpath_length,
            mean_est_size: accumulator.mean_size(),
            entropy: accumulator.entropy().ok(),
            mean_kpaths: accumulator.mean_kpaths(),
            category_means: accumulator.category_means(),
        }
    }
}

/// Every file named `file_name` below `root`, sorted by path.
///
/// Entries the walker cannot read are logged and skipped; only a missing
/// root is an error.
pub fn discover_observation_files(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(EstMetricsError::Corpus(format!("{} does not exist", root.display())));
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    Ok(matching_files(walker, file_name))
}

fn matching_files<I>(entries: I, file_name: &str) -> Vec<PathBuf>
where
    I: IntoIterator<Item = std::result::Result<DirEntry, ignore::Error>>,
{
    let mut found = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.file_name().map_or(false, |name| name == file_name) {
            found.push(path.to_path_buf());
        }
    }

    found.sort();
    found
}

/// Directory components between `root` and the observation file, e.g.
/// `["eval_type_directed", "random", "derived", "rep_1"]`
pub fn campaign_labels(root: &Path, file: &Path) -> Vec<String> {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractors::{EvalExtractor, PolicyExtractor};
    use serde_json::json;

    fn observation(status: &str, representation: &Value) -> String {
        json!({"status": status, "representation": representation.to_string()}).to_string()
    }

    fn analyzer() -> CorpusAnalyzer {
        CorpusAnalyzer::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_eval_corpus_stats() {
        let a = json!({"expression": {"&&": {"left": {"Value": true}, "right": {"Value": false}}}});
        let b = json!({"expression": {"!": {"arg": {"Value": 5}}}});
        let content = [
            observation("passed", &a),
            observation("passed", &a),
            observation("passed", &b),
            observation("failed", &b),
        ]
        .join("\n");

        let stats = analyzer().analyze_observations(&content, &EvalExtractor);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.expressions, 3);
        assert_eq!(stats.failed_records, 0);
        assert_eq!(stats.failed_expressions, 0);
        assert!((stats.unique_pct.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert!((stats.mean_est_size.unwrap() - 8.0 / 3.0).abs() < 1e-9);
        // graphs: {&& -> Value} twice and {! -> Value}; no two-edge paths
        assert_eq!(stats.mean_kpaths, Some(0.0));
        assert!((stats.category_means["bool-literal"] - 4.0 / 3.0).abs() < 1e-9);
        assert!(stats.entropy.unwrap() > 0.0);
    }

    #[test]
    fn test_policy_corpus_counts_every_condition() {
        let policy = json!({"policy": {"conditions": [
            {"kind": "when", "body": {"Value": true}},
            {"kind": "unless", "body": {"==": {"left": {"Var": "principal"}, "right": {"Value": "a"}}}}
        ]}});
        let content = observation("passed", &policy);

        let stats = analyzer().analyze_observations(&content, &PolicyExtractor);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.expressions, 2);
        assert_eq!(stats.mean_est_size, Some(2.0));
        assert_eq!(stats.unique_pct, Some(100.0));
    }

    #[test]
    fn test_bad_items_do_not_abort_corpus() {
        let good = json!({"expression": {"Value": 1}});
        let unresolved = json!({"expression": {"Value": null}});
        let malformed = json!({"expression": {"Value": 1, "Var": "x"}});
        let content = [
            "not json at all".to_string(),
            observation("passed", &good),
            observation("passed", &unresolved),
            observation("passed", &malformed),
            json!({"status": "passed", "representation": "{oops"}).to_string(),
            json!({"status": "passed", "representation": ""}).to_string(),
        ]
        .join("\n");

        let stats = analyzer().analyze_observations(&content, &EvalExtractor);
        assert_eq!(stats.records, 4);
        assert_eq!(stats.failed_records, 2);
        assert_eq!(stats.expressions, 1);
        assert_eq!(stats.failed_expressions, 2);
        assert_eq!(stats.mean_est_size, Some(1.0));
        assert_eq!(stats.entropy, Some(0.0));
    }

    #[test]
    fn test_empty_corpus_has_no_means() {
        let stats = analyzer().analyze_observations("", &EvalExtractor);
        assert_eq!(stats.records, 0);
        assert_eq!(stats.unique_pct, None);
        assert_eq!(stats.mean_est_size, None);
        assert_eq!(stats.entropy, None);
    }

    #[test]
    fn test_walk_errors_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("abac_type_directed/random/derived/rep_1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("obs.jsonl"), "").unwrap();

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let entries = std::iter::once(Err(ignore::Error::Io(denied)))
            .chain(WalkBuilder::new(dir.path()).hidden(false).build());

        let found = matching_files(entries, "obs.jsonl");
        assert_eq!(found, vec![nested.join("obs.jsonl")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_observation_files(&dir.path().join("absent"), "obs.jsonl");
        assert!(matches!(result, Err(EstMetricsError::Corpus(_))));
    }

    #[test]
    fn test_campaign_labels() {
        let root = Path::new("/data");
        let file = Path::new("/data/eval_type_directed/random/derived/rep_1/obs.jsonl");
        assert_eq!(
            campaign_labels(root, file),
            vec!["eval_type_directed", "random", "derived", "rep_1"]
        );
        assert!(campaign_labels(Path::new("/data/obs.jsonl"), Path::new("/data/obs.jsonl")).is_empty());
    }
}
