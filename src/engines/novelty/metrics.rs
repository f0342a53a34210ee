//! Similarity and dissimilarity measures.
//!
//! Two families that are never mixed: the genotype family compares numeric
//! weight vectors, the phenotype family compares token sequences. Every
//! measure maps to [0, 1] with similarity 1 for identical inputs, and
//! dissimilarity is always `1 - similarity`.

use crate::types::Token;
use std::collections::HashMap;
use std::f64::consts::SQRT_2;

/// Similarity of two weight vectors that each sum to 1. Their Euclidean
/// distance lies in [0, sqrt(2)] and is rescaled so that distance 0 maps to 1.
/// Inputs outside the simplex are clamped into [0, 1].
pub fn norm_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "genotype vectors must have equal length");
    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    ((SQRT_2 - distance) / SQRT_2).clamp(0.0, 1.0)
}

pub fn norm_dissimilarity(a: &[f64], b: &[f64]) -> f64 {
    1.0 - norm_similarity(a, b)
}

/// Multiset Jaccard similarity of two token sequences:
/// sum of min counts over sum of max counts. Two empty sequences are identical.
pub fn str_similarity<T: AsRef<str>>(a: &[T], b: &[T]) -> f64 {
    let counts_a = token_counts(a);
    let counts_b = token_counts(b);

    let mut intersection = 0usize;
    let mut union = 0usize;
    for (token, &ca) in &counts_a {
        let cb = counts_b.get(token).copied().unwrap_or(0);
        intersection += ca.min(cb);
        union += ca.max(cb);
    }
    union += counts_b
        .iter()
        .filter(|(token, _)| !counts_a.contains_key(*token))
        .map(|(_, &cb)| cb)
        .sum::<usize>();

    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

fn token_counts<T: AsRef<str>>(seq: &[T]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in seq {
        *counts.entry(token.as_ref()).or_insert(0) += 1;
    }
    counts
}

pub fn str_dissimilarity<T: AsRef<str>>(a: &[T], b: &[T]) -> f64 {
    1.0 - str_similarity(a, b)
}

/// Phenotype comparison used by the archive and novelty scoring
pub trait SequenceMetric: Send + Sync {
    fn similarity(&self, a: &[Token], b: &[Token]) -> f64;

    fn dissimilarity(&self, a: &[Token], b: &[Token]) -> f64 {
        1.0 - self.similarity(a, b)
    }
}

/// Token-overlap (multiset Jaccard) similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardMetric;

impl SequenceMetric for JaccardMetric {
    fn similarity(&self, a: &[Token], b: &[Token]) -> f64 {
        str_similarity(a, b)
    }
}
