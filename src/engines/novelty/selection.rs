//! Tournament and best-k selection over scalar scores, parametrized by an
//! explicit optimization direction.

use crate::engines::generation::pareto::OptimizationDirection;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which neighbours novelty is measured against.
///
/// Candidates are scored by their similarity to the target; `LeastSimilar`
/// prefers low similarity (the weighting used by the reference system),
/// `MostSimilar` prefers high similarity (nearest neighbours).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSelection {
    MostSimilar,
    #[default]
    LeastSimilar,
}

impl NeighborSelection {
    pub fn direction(self) -> OptimizationDirection {
        match self {
            NeighborSelection::MostSimilar => OptimizationDirection::Maximize,
            NeighborSelection::LeastSimilar => OptimizationDirection::Minimize,
        }
    }
}

/// Ordering that puts the preferred score first
fn preference(direction: OptimizationDirection, a: f64, b: f64) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    match direction {
        OptimizationDirection::Maximize => ord.reverse(),
        OptimizationDirection::Minimize => ord,
    }
}

/// `k` tournaments, each over `tournament_size` candidates drawn with
/// replacement; the first best aspirant wins. Returns winner indices
/// (possibly repeated). Empty input yields no winners.
pub fn tournament_indices<R: Rng>(
    scores: &[f64],
    k: usize,
    tournament_size: usize,
    direction: OptimizationDirection,
    rng: &mut R,
) -> Vec<usize> {
    if scores.is_empty() || tournament_size == 0 {
        return Vec::new();
    }

    (0..k)
        .map(|_| {
            let mut best_idx = rng.gen_range(0..scores.len());
            for _ in 1..tournament_size {
                let idx = rng.gen_range(0..scores.len());
                if preference(direction, scores[idx], scores[best_idx]) == Ordering::Less {
                    best_idx = idx;
                }
            }
            best_idx
        })
        .collect()
}

/// Indices of the `k` preferred scores; ties keep input order.
pub fn best_indices(scores: &[f64], k: usize, direction: OptimizationDirection) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| preference(direction, scores[a], scores[b]));
    indices.truncate(k);
    indices
}
