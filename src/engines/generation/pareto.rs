/// Pareto utilities for the dual-objective search.
/// Dominance test plus SPEA2 environmental selection.

use std::cmp::Ordering;

/// Defines whether an objective should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

/// Directions of `Fitness::objectives()`: cost is minimized, novelty maximized
pub const FITNESS_DIRECTIONS: [OptimizationDirection; 2] =
    [OptimizationDirection::Minimize, OptimizationDirection::Maximize];

/// Check if individual A dominates individual B
/// A dominates B if A is no worse than B in all objectives and strictly better in at least one
pub fn dominates(
    a_objectives: &[f64],
    b_objectives: &[f64],
    directions: &[OptimizationDirection],
) -> bool {
    if a_objectives.len() != b_objectives.len() || a_objectives.len() != directions.len() {
        return false;
    }

    let mut at_least_one_better = false;

    for i in 0..a_objectives.len() {
        let a_val = a_objectives[i];
        let b_val = b_objectives[i];

        let (a_better, b_better) = match directions[i] {
            OptimizationDirection::Maximize => (a_val > b_val, b_val > a_val),
            OptimizationDirection::Minimize => (a_val < b_val, b_val < a_val),
        };

        if b_better {
            return false;
        }

        if a_better {
            at_least_one_better = true;
        }
    }

    at_least_one_better
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// SPEA2 raw fitness: for each individual, the summed strength (number of
/// individuals dominated) of everyone dominating it. Zero means non-dominated.
pub fn raw_fitness<O: AsRef<[f64]>>(objectives: &[O], directions: &[OptimizationDirection]) -> Vec<f64> {
    let n = objectives.len();
    let mut strength = vec![0usize; n];
    let mut dominators: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in 0..n {
            if i != j && dominates(objectives[i].as_ref(), objectives[j].as_ref(), directions) {
                strength[i] += 1;
                dominators[j].push(i);
            }
        }
    }

    dominators
        .iter()
        .map(|doms| doms.iter().map(|&d| strength[d] as f64).sum())
        .collect()
}

/// SPEA2 environmental selection of `k` indices.
///
/// Non-dominated individuals (raw fitness below 1) are taken in index order.
/// When they are too few, the rest are filled by raw fitness plus density
/// `1 / (sigma_k + 2)`, where `sigma_k` is the distance to the k-th nearest
/// neighbour with `k = floor(sqrt(n))`; ties keep index order. When they are
/// too many, the individual whose sorted neighbour distances are
/// lexicographically smallest is removed until `k` remain. Asking for `n` or
/// more returns every index, front first.
pub fn spea2_select<O: AsRef<[f64]>>(
    objectives: &[O],
    k: usize,
    directions: &[OptimizationDirection],
) -> Vec<usize> {
    let raw = raw_fitness(objectives, directions);
    let chosen: Vec<usize> = (0..objectives.len()).filter(|&i| raw[i] < 1.0).collect();

    match chosen.len().cmp(&k) {
        Ordering::Equal => chosen,
        Ordering::Less => spea2_fill(objectives, &raw, chosen, k),
        Ordering::Greater => spea2_truncate(objectives, chosen, k),
    }
}

fn spea2_fill<O: AsRef<[f64]>>(objectives: &[O], raw: &[f64], mut chosen: Vec<usize>, k: usize) -> Vec<usize> {
    let n = objectives.len();
    let k_nearest = ((n as f64).sqrt() as usize).max(1);

    let mut rest: Vec<(f64, usize)> = (0..n)
        .filter(|i| !chosen.contains(i))
        .map(|i| {
            let mut distances: Vec<f64> = (0..n)
                .filter(|&j| j != i)
                .map(|j| euclidean(objectives[i].as_ref(), objectives[j].as_ref()))
                .collect();
            distances.sort_by(|a, b| a.total_cmp(b));
            let sigma = distances
                .get(k_nearest.min(distances.len()).saturating_sub(1))
                .copied()
                .unwrap_or(0.0);
            (raw[i] + 1.0 / (sigma + 2.0), i)
        })
        .collect();
    rest.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let missing = k.saturating_sub(chosen.len());
    chosen.extend(rest.into_iter().take(missing).map(|(_, i)| i));
    chosen
}

fn spea2_truncate<O: AsRef<[f64]>>(objectives: &[O], mut chosen: Vec<usize>, k: usize) -> Vec<usize> {
    while chosen.len() > k {
        let neighbour_distances: Vec<Vec<f64>> = chosen
            .iter()
            .map(|&i| {
                let mut d: Vec<f64> = chosen
                    .iter()
                    .filter(|&&j| j != i)
                    .map(|&j| euclidean(objectives[i].as_ref(), objectives[j].as_ref()))
                    .collect();
                d.sort_by(|a, b| a.total_cmp(b));
                d
            })
            .collect();

        let mut victim = 0;
        for pos in 1..chosen.len() {
            let smaller = neighbour_distances[pos]
                .iter()
                .zip(&neighbour_distances[victim])
                .map(|(a, b)| a.total_cmp(b))
                .find(|o| *o != Ordering::Equal)
                == Some(Ordering::Less);
            if smaller {
                victim = pos;
            }
        }
        chosen.remove(victim);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominates() {
        let directions = vec![OptimizationDirection::Maximize, OptimizationDirection::Minimize];

        // A has higher first objective (good) and lower second objective (good)
        assert!(dominates(&[10.0, 5.0], &[5.0, 10.0], &directions));

        // A has higher first (good) but higher second (bad) - no dominance
        assert!(!dominates(&[10.0, 15.0], &[5.0, 10.0], &directions));

        // Equal points never dominate each other
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0], &directions));
    }

    #[test]
    fn test_raw_fitness() {
        let objectives = vec![[1.0, 1.0], [2.0, 4.0], [3.0, 0.0], [4.0, -1.0]];
        let raw = raw_fitness(&objectives, &FITNESS_DIRECTIONS);
        // Cost is minimized and novelty maximized: the first two trade off
        assert_eq!(raw[0], 0.0);
        assert_eq!(raw[1], 0.0);
        assert_eq!(raw[2], 2.0 + 2.0);
        assert_eq!(raw[3], 2.0 + 2.0 + 1.0);
    }

    #[test]
    fn test_select_exact_front() {
        let objectives = vec![[1.0, 1.0], [3.0, 0.0], [2.0, 4.0], [4.0, -1.0]];
        assert_eq!(spea2_select(&objectives, 2, &FITNESS_DIRECTIONS), vec![0, 2]);
    }

    #[test]
    fn test_select_fills_by_fitness() {
        let objectives = vec![[1.0, 1.0], [3.0, 0.0], [2.0, 4.0], [4.0, -1.0]];
        let selected = spea2_select(&objectives, 3, &FITNESS_DIRECTIONS);
        assert_eq!(selected, vec![0, 2, 1]);
    }

    #[test]
    fn test_select_truncates_crowded_front() {
        // Three mutually non-dominated points; the middle pair is the closest
        let objectives = vec![[0.0, 0.0], [10.0, 10.0], [10.5, 10.5], [20.0, 20.0]];
        let selected = spea2_select(&objectives, 3, &FITNESS_DIRECTIONS);
        assert_eq!(selected.len(), 3);
        assert!(selected.contains(&0));
        assert!(selected.contains(&3));
        // Both middle points have the same nearest distance; the second is
        // closer to its runner-up
        assert_eq!(selected, vec![0, 1, 3]);
    }

    #[test]
    fn test_select_everything() {
        let objectives = vec![[3.0, 0.0], [1.0, 0.0]];
        let selected = spea2_select(&objectives, 5, &FITNESS_DIRECTIONS);
        assert_eq!(selected, vec![1, 0]);
    }

    #[test]
    fn test_identical_objectives_keep_index_order() {
        let objectives = vec![[2.0, 0.0]; 6];
        assert_eq!(spea2_select(&objectives, 4, &FITNESS_DIRECTIONS).len(), 4);
        let selected = spea2_select(&objectives, 6, &FITNESS_DIRECTIONS);
        assert_eq!(selected, vec![0, 1, 2, 3, 4, 5]);
    }
}
