use crate::config::NoveltyConfig;
use crate::engines::markov::{LikelihoodScorer, TransitionTable};
use crate::engines::novelty::{AdmissionPolicy, NoveltyArchive, NoveltyScorer, SequenceMetric};
use crate::types::{Fitness, Individual, Sequence};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Method names containing this marker never leave fitness-only evaluation
pub const FITNESS_ONLY_MARKER: &str = "fitness_only";

/// Which objectives are computed in a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluatorMode {
    /// Cost only; novelty is fixed at 0
    #[serde(rename = "F")]
    FitnessOnly,
    /// Cost and novelty; novelty scoring admits to the archive
    #[serde(rename = "H")]
    FitnessAndNovelty,
}

impl EvaluatorMode {
    pub fn code(self) -> &'static str {
        match self {
            EvaluatorMode::FitnessOnly => "F",
            EvaluatorMode::FitnessAndNovelty => "H",
        }
    }
}

impl fmt::Display for EvaluatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Two-state machine choosing the evaluator from the feasible count of the
/// previous generation. At or above `feasible_max` it moves to
/// fitness+novelty, at or below `feasible_min` back to fitness-only, and in
/// between it keeps its state. A locked switch stays fitness-only.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveSwitch {
    mode: EvaluatorMode,
    feasible_min: usize,
    feasible_max: usize,
    locked: bool,
}

impl AdaptiveSwitch {
    pub fn new(feasible_min: usize, feasible_max: usize) -> Self {
        Self {
            mode: EvaluatorMode::FitnessOnly,
            feasible_min,
            feasible_max,
            locked: false,
        }
    }

    /// Switch for a named method; `*fitness_only*` methods are locked.
    pub fn for_method(method: &str, config: &NoveltyConfig) -> Self {
        let mut switch = Self::new(config.feasible_min, config.feasible_max);
        switch.locked = method.contains(FITNESS_ONLY_MARKER);
        switch
    }

    pub fn mode(&self) -> EvaluatorMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Feed the latest feasible count and return the evaluator to run next.
    pub fn update(&mut self, feasible: usize) -> EvaluatorMode {
        if self.locked {
            return self.mode;
        }
        if feasible >= self.feasible_max {
            self.mode = EvaluatorMode::FitnessAndNovelty;
        } else if feasible <= self.feasible_min {
            self.mode = EvaluatorMode::FitnessOnly;
        }
        self.mode
    }
}

/// Scores individuals: likelihood cost always, archive admission and novelty
/// in [`EvaluatorMode::FitnessAndNovelty`].
///
/// Costs are independent and computed in parallel. Admission and novelty run
/// serially in input order, each admission visible to the next individual.
#[derive(Clone)]
pub struct Evaluator {
    table: Arc<TransitionTable>,
    floor: f64,
    metric: Arc<dyn SequenceMetric>,
    admission: AdmissionPolicy,
    novelty: NoveltyScorer,
}

impl Evaluator {
    pub fn new(
        table: Arc<TransitionTable>,
        floor: f64,
        metric: Arc<dyn SequenceMetric>,
        config: &NoveltyConfig,
    ) -> Self {
        Self {
            table,
            floor,
            metric,
            admission: AdmissionPolicy::from(config),
            novelty: NoveltyScorer::from(config),
        }
    }

    pub fn with_metric(mut self, metric: Arc<dyn SequenceMetric>) -> Self {
        self.metric = metric;
        self
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Cost above which an individual counts as feasible
    pub fn feasibility_threshold(&self) -> f64 {
        self.admission.fitness_threshold
    }

    pub fn cost(&self, sequence: &[String]) -> f64 {
        LikelihoodScorer::with_floor(&self.table, self.floor).cost(sequence)
    }

    /// Evaluate every individual and return how many are feasible.
    pub fn evaluate_all<R: Rng>(
        &self,
        mode: EvaluatorMode,
        individuals: &mut [Individual],
        population: &[Sequence],
        archive: &mut NoveltyArchive,
        rng: &mut R,
    ) -> usize {
        let indices: Vec<usize> = (0..individuals.len()).collect();
        self.evaluate_indices(mode, individuals, &indices, population, archive, rng);
        individuals
            .iter()
            .filter_map(|ind| ind.cost())
            .filter(|&cost| cost > self.feasibility_threshold())
            .count()
    }

    /// Evaluate only individuals without fitness; returns how many were scored.
    pub fn evaluate_invalid<R: Rng>(
        &self,
        mode: EvaluatorMode,
        individuals: &mut [Individual],
        population: &[Sequence],
        archive: &mut NoveltyArchive,
        rng: &mut R,
    ) -> usize {
        let indices: Vec<usize> = individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.is_valid())
            .map(|(i, _)| i)
            .collect();
        self.evaluate_indices(mode, individuals, &indices, population, archive, rng);
        indices.len()
    }

    fn evaluate_indices<R: Rng>(
        &self,
        mode: EvaluatorMode,
        individuals: &mut [Individual],
        indices: &[usize],
        population: &[Sequence],
        archive: &mut NoveltyArchive,
        rng: &mut R,
    ) {
        let scorer = LikelihoodScorer::with_floor(&self.table, self.floor);
        let costs: Vec<f64> = {
            let shared: &[Individual] = individuals;
            indices
                .par_iter()
                .map(|&i| scorer.cost(&shared[i].sequence))
                .collect()
        };

        for (&i, cost) in indices.iter().zip(costs) {
            let novelty = match mode {
                EvaluatorMode::FitnessOnly => 0.0,
                EvaluatorMode::FitnessAndNovelty => {
                    let sequence = &individuals[i].sequence;
                    archive.try_admit(sequence, cost, &self.admission, self.metric.as_ref());
                    self.novelty
                        .novelty(sequence, population, archive, self.metric.as_ref(), rng)
                }
            };
            individuals[i].fitness = Some(Fitness::new(cost, novelty));
        }
    }
}
