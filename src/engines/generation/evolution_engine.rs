use crate::config::{AppConfig, EvolutionConfig, NoveltyConfig};
use crate::engines::generation::{
    evaluator::{AdaptiveSwitch, Evaluator, EvaluatorMode},
    operators::{cx_two_point, mut_shuffle_indexes, random_individual},
    pareto::{spea2_select, FITNESS_DIRECTIONS},
    progress::{GenerationSummary, ProgressCallback},
    statistics::{GenerationRecord, RunConstants, RunStatistics},
};
use crate::engines::markov::TransitionTable;
use crate::engines::novelty::{JaccardMetric, NoveltyArchive, SequenceMetric};
use crate::error::{MotifError, Result};
use crate::types::{Individual, Sequence, Token};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Size of the final SPEA2 selection reported with the run
pub const PARETO_FRONT_SIZE: usize = 7;

/// Outcome of a single generation
#[derive(Debug, Clone)]
pub struct GenerationStep {
    pub record: GenerationRecord,
    /// Clones of the first selected individuals, carried over unmodified
    pub elite: Vec<Individual>,
}

/// Objective vectors for selection; an unevaluated individual is the worst possible
fn objectives_of(population: &[Individual]) -> Vec<[f64; 2]> {
    population
        .iter()
        .map(|ind| ind.fitness.map(|f| f.objectives()).unwrap_or([f64::INFINITY, 0.0]))
        .collect()
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    novelty_config: NoveltyConfig,
    method: String,
    seed: u64,
    evaluator: Evaluator,
    switch: AdaptiveSwitch,
    archive: NoveltyArchive,
    population: Vec<Individual>,
    feasible: usize,
    generation: usize,
    rng: StdRng,
}

impl EvolutionEngine {
    /// Validate the configuration and create the initial population from the
    /// alphabet. Novelty uses the token Jaccard metric unless replaced with
    /// [`EvolutionEngine::with_metric`].
    pub fn new(
        config: &AppConfig,
        table: Arc<TransitionTable>,
        alphabet: &[Token],
        method: &str,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if alphabet.is_empty() {
            return Err(MotifError::EmptyAlphabet);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let population = (0..config.evolution.population_size)
            .map(|_| random_individual(alphabet, config.evolution.individual_size, &mut rng).map(Individual::new))
            .collect::<Result<Vec<_>>>()?;

        let metric: Arc<dyn SequenceMetric> = Arc::new(JaccardMetric);
        let evaluator = Evaluator::new(table, config.markov.floor_probability, metric, &config.novelty);
        let switch = AdaptiveSwitch::for_method(method, &config.novelty);
        if switch.is_locked() {
            log::info!("Method '{}' runs fitness-only evaluation throughout", method);
        }

        Ok(Self {
            config: config.evolution.clone(),
            novelty_config: config.novelty.clone(),
            method: method.to_string(),
            seed,
            evaluator,
            switch,
            archive: NoveltyArchive::new(),
            population,
            feasible: 0,
            generation: 0,
            rng,
        })
    }

    pub fn with_metric(mut self, metric: Arc<dyn SequenceMetric>) -> Self {
        self.evaluator = self.evaluator.with_metric(metric);
        self
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn archive(&self) -> &NoveltyArchive {
        &self.archive
    }

    pub fn mode(&self) -> EvaluatorMode {
        self.switch.mode()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Evaluate, select, vary and merge once.
    pub fn step(&mut self) -> GenerationStep {
        let mode = self.switch.update(self.feasible);
        let snapshot: Vec<Sequence> = self.population.iter().map(|i| i.sequence.clone()).collect();

        self.feasible = self.evaluator.evaluate_all(
            mode,
            &mut self.population,
            &snapshot,
            &mut self.archive,
            &mut self.rng,
        );

        let objectives = objectives_of(&self.population);
        let survivors = self.config.population_size - self.config.elite_count;
        let mut offspring: Vec<Individual> = spea2_select(&objectives, survivors, &FITNESS_DIRECTIONS)
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect();
        let elite: Vec<Individual> = offspring.iter().take(self.config.elite_count).cloned().collect();

        self.vary(&mut offspring);
        let rescored = self.evaluator.evaluate_invalid(
            mode,
            &mut offspring,
            &snapshot,
            &mut self.archive,
            &mut self.rng,
        );
        log::trace!("Generation {}: {} offspring re-evaluated", self.generation, rescored);

        let mut next = elite.clone();
        next.extend(offspring);
        self.population = next;

        let record = GenerationRecord::new(
            self.generation,
            mode,
            self.feasible,
            self.population.clone(),
            self.archive.snapshot(),
        );
        self.generation += 1;

        GenerationStep { record, elite }
    }

    /// Crossover over consecutive pairs, then per-individual mutation.
    fn vary(&mut self, offspring: &mut [Individual]) {
        for pair in offspring.chunks_mut(2) {
            if let [a, b] = pair {
                if self.rng.gen::<f64>() < self.config.crossover_probability {
                    cx_two_point(&mut a.sequence, &mut b.sequence, &mut self.rng);
                    a.invalidate();
                    b.invalidate();
                }
            }
        }

        for mutant in offspring.iter_mut() {
            if self.rng.gen::<f64>() < self.config.mutation_probability {
                mut_shuffle_indexes(&mut mutant.sequence, self.config.shuffle_index_probability, &mut self.rng);
                mutant.invalidate();
            }
        }
    }

    /// Run all configured generations and collect the statistics.
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<RunStatistics> {
        let started_at = Utc::now();
        log::info!(
            "Starting run '{}' (seed {}): {} generations of {} individuals",
            self.method,
            self.seed,
            self.config.generations,
            self.config.population_size
        );

        let mut generations = Vec::with_capacity(self.config.generations);
        for generation in 0..self.config.generations {
            callback.on_generation_start(generation);

            let step = self.step();
            let record = step.record;
            if record.population.len() != self.config.population_size {
                return Err(MotifError::Generation(format!(
                    "Population size drifted to {} in generation {}",
                    record.population.len(),
                    generation
                )));
            }

            callback.on_generation_complete(&GenerationSummary {
                generation,
                total_generations: self.config.generations,
                evaluator: record.evaluator,
                feasible: record.feasible,
                mean_cost: record.mean_cost,
                best_cost: record.best_cost().unwrap_or(f64::NAN),
                mean_novelty: record.mean_novelty,
                archive_size: record.archive_size,
            });
            generations.push(record);
        }

        let objectives = objectives_of(&self.population);
        let pareto_front = spea2_select(&objectives, PARETO_FRONT_SIZE, &FITNESS_DIRECTIONS)
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect();

        let elapsed_seconds = (Utc::now() - started_at).num_milliseconds() as f64 / 1000.0;
        log::info!(
            "Run '{}' finished in {:.2}s, archive holds {} exemplars",
            self.method,
            elapsed_seconds,
            self.archive.len()
        );

        Ok(RunStatistics {
            corpus: None,
            method: self.method.clone(),
            seed: self.seed,
            constants: RunConstants::new(&self.config, &self.novelty_config),
            started_at,
            generations,
            elapsed_seconds,
            pareto_front,
        })
    }
}
