//! Append-only archive of exemplar sequences for novelty search.

use super::metrics::SequenceMetric;
use crate::config::NoveltyConfig;
use crate::types::{Sequence, Token};
use serde::{Deserialize, Serialize};

/// Thresholds of the admission test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionPolicy {
    /// Cost an individual must exceed to be considered
    pub fitness_threshold: f64,
    /// Mean dissimilarity to the closest members that must be exceeded
    pub min_dissimilarity: f64,
    /// How many of the closest members are averaged
    pub neighbors: usize,
}

impl From<&NoveltyConfig> for AdmissionPolicy {
    fn from(config: &NoveltyConfig) -> Self {
        Self {
            fitness_threshold: config.fitness_threshold,
            min_dissimilarity: config.archive_min_dissimilarity,
            neighbors: config.archive_neighbors,
        }
    }
}

/// Exemplars admitted during a run. Entries are never evicted, deduplicated or
/// re-validated; admission takes `&mut self`, so concurrent writers must go
/// through a single owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoveltyArchive {
    entries: Vec<Sequence>,
}

impl NoveltyArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Sequence] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<Sequence> {
        self.entries.clone()
    }

    /// Mean dissimilarity of `candidate` to its `neighbors` most similar
    /// members, or `None` for an empty archive.
    pub fn dissimilarity(&self, candidate: &[Token], neighbors: usize, metric: &dyn SequenceMetric) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let mut values: Vec<f64> = self
            .entries
            .iter()
            .map(|member| metric.dissimilarity(member, candidate))
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let take = neighbors.min(values.len()).max(1);
        Some(values[..take].iter().sum::<f64>() / take as f64)
    }

    /// Admit `candidate` when its cost exceeds the threshold and it is either
    /// the first entry or different enough from the closest members. Returns
    /// whether it was appended; a rejection has no side effect.
    pub fn try_admit(
        &mut self,
        candidate: &[Token],
        cost: f64,
        policy: &AdmissionPolicy,
        metric: &dyn SequenceMetric,
    ) -> bool {
        if cost <= policy.fitness_threshold {
            return false;
        }

        let admitted = match self.dissimilarity(candidate, policy.neighbors, metric) {
            None => true,
            Some(d) => d > policy.min_dissimilarity,
        };

        if admitted {
            self.entries.push(candidate.to_vec());
            log::debug!("Archive admission #{} (cost {:.2})", self.entries.len(), cost);
        }
        admitted
    }
}
