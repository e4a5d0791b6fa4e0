// src/core/metrics.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EstMetricsError, Result};
use super::est::{kind_of, subexpressions_of, CategoryTable, EstNode};
use super::kind_graph::k_path_count;

/// Category label -> number of subexpressions in that category
pub type FrequencyMap = BTreeMap<String, usize>;

/// Total number of subexpressions, the node itself included
pub fn size_of(node: &EstNode<'_>) -> Result<usize> {
    Ok(subexpressions_of(node)?.len())
}

/// Count every subexpression by category. Only observed categories appear.
pub fn category_frequency_map(node: &EstNode<'_>, categories: &CategoryTable) -> Result<FrequencyMap> {
    let mut frequencies = FrequencyMap::new();

    for subexpr in subexpressions_of(node)? {
        let kind = kind_of(&subexpr)?;
        let category = categories.category_of(kind.as_str());
        *frequencies.entry(category.to_string()).or_insert(0) += 1;
    }

    Ok(frequencies)
}

/// Shannon entropy (natural log) of a frequency map after normalizing it
/// to probabilities
pub fn normalized_entropy(frequencies: &FrequencyMap) -> Result<f64> {
    entropy_of_weights(frequencies.values().map(|&count| count as f64))
}

/// Shannon entropy (natural log) of non-negative weights, normalized by
/// their sum. Zero weights contribute nothing.
pub fn entropy_of_weights<I>(weights: I) -> Result<f64>
where
    I: IntoIterator<Item = f64>,
{
    let weights: Vec<f64> = weights.into_iter().collect();
    let total: f64 = weights.iter().sum();

    if weights.is_empty() || total <= 0.0 {
        return Err(EstMetricsError::EmptyDistribution);
    }

    let entropy = weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum::<f64>();

    // a single category gives -1 * ln(1) = -0.0
    Ok(entropy.max(0.0))
}

/// Every per-expression metric in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionMetrics {
    pub size: usize,
    pub categories: FrequencyMap,
    pub entropy: f64,
    pub kpath_length: usize,
    pub kpaths: usize,
}

impl ExpressionMetrics {
    pub fn compute(raw: &Value, categories: &CategoryTable, kpath_length: usize) -> Result<Self> {
        let node = EstNode::new(raw)?;
        let frequencies = category_frequency_map(&node, categories)?;

        Ok(Self {
            size: frequencies.values().sum(),
            entropy: normalized_entropy(&frequencies)?,
            categories: frequencies,
            kpath_length,
            kpaths: k_path_count(&node, kpath_length)?,
        })
    }
}

/// Running corpus totals.
///
/// Corpus entropy is the entropy of the mean category vector (categories an
/// item lacks count as zero for it), which is not the mean of per-item
/// entropies.
#[derive(Debug, Clone, Default)]
pub struct CorpusAccumulator {
    items: usize,
    total_size: usize,
    total_kpaths: usize,
    category_totals: BTreeMap<String, usize>,
}

impl CorpusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, metrics: &ExpressionMetrics) {
        self.items += 1;
        self.total_size += metrics.size;
        self.total_kpaths += metrics.kpaths;
        for (category, count) in &metrics.categories {
            *self.category_totals.entry(category.clone()).or_insert(0) += count;
        }
    }

    pub fn items(&self) -> usize {
        self.items
    }

    pub fn mean_size(&self) -> Option<f64> {
        self.mean(self.total_size)
    }

    pub fn mean_kpaths(&self) -> Option<f64> {
        self.mean(self.total_kpaths)
    }

    /// Per-category mean frequency across all items
    pub fn category_means(&self) -> BTreeMap<String, f64> {
        if self.items == 0 {
            return BTreeMap::new();
        }
        let n = self.items as f64;
        self.category_totals
            .iter()
            .map(|(category, &total)| (category.clone(), total as f64 / n))
            .collect()
    }

    /// Entropy of the normalized mean category vector
    pub fn entropy(&self) -> Result<f64> {
        entropy_of_weights(self.category_means().into_values())
    }

    fn mean(&self, total: usize) -> Option<f64> {
        (self.items > 0).then(|| total as f64 / self.items as f64)
    }
}
