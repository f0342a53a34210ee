use super::archive::NoveltyArchive;
use super::metrics::SequenceMetric;
use super::selection::{best_indices, tournament_indices, NeighborSelection};
use crate::config::NoveltyConfig;
use crate::types::{Sequence, Token};
use rand::Rng;

/// k-neighbour novelty of an individual against population and archive.
///
/// Population candidates (the target's first occurrence excluded) are reduced
/// by `neighbor_count` tournaments of `tournament_size`; every archive member
/// joins them, and the `neighbor_count` preferred of that pool are the
/// neighbours. Candidates are ranked by similarity to the target in the
/// direction given by [`NeighborSelection`]. Novelty is the mean
/// dissimilarity to the neighbours.
#[derive(Debug, Clone, Copy)]
pub struct NoveltyScorer {
    pub neighbor_count: usize,
    pub tournament_size: usize,
    pub selection: NeighborSelection,
}

impl From<&NoveltyConfig> for NoveltyScorer {
    fn from(config: &NoveltyConfig) -> Self {
        Self {
            neighbor_count: config.neighbor_count,
            tournament_size: config.tournament_size,
            selection: config.neighbor_selection,
        }
    }
}

impl NoveltyScorer {
    /// Indices of the chosen neighbours: `Ok` into the population, `Err` into the archive.
    pub fn neighbours<R: Rng>(
        &self,
        target: &[Token],
        population: &[Sequence],
        archive: &NoveltyArchive,
        metric: &dyn SequenceMetric,
        rng: &mut R,
    ) -> Vec<Result<usize, usize>> {
        let excluded = population.iter().position(|member| member.as_slice() == target);
        let pop_candidates: Vec<usize> = (0..population.len())
            .filter(|&i| Some(i) != excluded)
            .collect();
        let pop_scores: Vec<f64> = pop_candidates
            .iter()
            .map(|&i| metric.similarity(target, &population[i]))
            .collect();

        let direction = self.selection.direction();
        let winners = tournament_indices(
            &pop_scores,
            self.neighbor_count,
            self.tournament_size,
            direction,
            rng,
        );

        let mut pool: Vec<Result<usize, usize>> = Vec::with_capacity(winners.len() + archive.len());
        let mut pool_scores: Vec<f64> = Vec::with_capacity(winners.len() + archive.len());
        for w in winners {
            pool.push(Ok(pop_candidates[w]));
            pool_scores.push(pop_scores[w]);
        }
        for (i, member) in archive.iter().enumerate() {
            pool.push(Err(i));
            pool_scores.push(metric.similarity(target, member));
        }

        best_indices(&pool_scores, self.neighbor_count, direction)
            .into_iter()
            .map(|i| pool[i])
            .collect()
    }

    /// Mean dissimilarity to the selected neighbours; 0 when there are none.
    pub fn novelty<R: Rng>(
        &self,
        target: &[Token],
        population: &[Sequence],
        archive: &NoveltyArchive,
        metric: &dyn SequenceMetric,
        rng: &mut R,
    ) -> f64 {
        if archive.is_empty() {
            log::warn!("Novelty requested with an empty archive: falling back to population neighbours only");
        }

        let neighbours = self.neighbours(target, population, archive, metric, rng);
        if neighbours.is_empty() {
            return 0.0;
        }

        let total: f64 = neighbours
            .iter()
            .map(|n| match n {
                Ok(i) => metric.dissimilarity(target, &population[*i]),
                Err(i) => metric.dissimilarity(target, &archive.entries()[*i]),
            })
            .sum();
        total / neighbours.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::novelty::archive::AdmissionPolicy;
    use crate::engines::novelty::metrics::JaccardMetric;
    use crate::types::sequence_of;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scorer(selection: NeighborSelection) -> NoveltyScorer {
        NoveltyScorer {
            neighbor_count: 4,
            tournament_size: 5,
            selection,
        }
    }

    fn archive_of(members: &[&[&str]]) -> NoveltyArchive {
        let mut archive = NoveltyArchive::new();
        let open = AdmissionPolicy {
            fitness_threshold: f64::NEG_INFINITY,
            min_dissimilarity: -1.0,
            neighbors: 1,
        };
        for m in members {
            archive.try_admit(&sequence_of(m), 0.0, &open, &JaccardMetric);
        }
        archive
    }

    #[test]
    fn test_target_first_occurrence_excluded() {
        let target = sequence_of(&["a", "a"]);
        let population = vec![target.clone()];
        let mut rng = StdRng::seed_from_u64(1);
        let novelty = scorer(NeighborSelection::MostSimilar).novelty(
            &target,
            &population,
            &NoveltyArchive::new(),
            &JaccardMetric,
            &mut rng,
        );
        // The only population member is the target itself: no neighbours
        assert_eq!(novelty, 0.0);
    }

    #[test]
    fn test_duplicate_of_target_is_a_neighbour() {
        let target = sequence_of(&["a", "a"]);
        let population = vec![target.clone(), target.clone()];
        let mut rng = StdRng::seed_from_u64(1);
        let novelty = scorer(NeighborSelection::MostSimilar).novelty(
            &target,
            &population,
            &NoveltyArchive::new(),
            &JaccardMetric,
            &mut rng,
        );
        assert_eq!(novelty, 0.0);
        let neighbours = scorer(NeighborSelection::MostSimilar).neighbours(
            &target,
            &population,
            &NoveltyArchive::new(),
            &JaccardMetric,
            &mut rng,
        );
        assert!(neighbours.iter().all(|n| *n == Ok(1)));
    }

    #[test]
    fn test_direction_changes_neighbourhood() {
        let target = sequence_of(&["a", "b"]);
        // Archive only, so selection is deterministic
        let archive = archive_of(&[
            &["a", "b"],
            &["a", "b"],
            &["a", "b"],
            &["a", "b"],
            &["x", "y"],
            &["x", "y"],
            &["x", "y"],
            &["x", "y"],
        ]);
        let mut rng = StdRng::seed_from_u64(2);

        let nearest = scorer(NeighborSelection::MostSimilar)
            .novelty(&target, &[], &archive, &JaccardMetric, &mut rng);
        let farthest = scorer(NeighborSelection::LeastSimilar)
            .novelty(&target, &[], &archive, &JaccardMetric, &mut rng);

        assert_eq!(nearest, 0.0);
        assert_eq!(farthest, 1.0);
    }

    #[test]
    fn test_archive_members_compete_with_population() {
        let target = sequence_of(&["a", "b"]);
        let population = vec![sequence_of(&["a", "c"]); 6];
        let archive = archive_of(&[&["a", "b"]]);
        let mut rng = StdRng::seed_from_u64(5);

        let neighbours = scorer(NeighborSelection::MostSimilar)
            .neighbours(&target, &population, &archive, &JaccardMetric, &mut rng);
        assert_eq!(neighbours.len(), 4);
        assert_eq!(neighbours[0], Err(0));
    }
}
