use super::evaluator::EvaluatorMode;
use crate::config::{EvolutionConfig, NoveltyConfig};
use crate::error::Result;
use crate::types::{Individual, Sequence};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters a run was started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConstants {
    pub individual_size: usize,
    pub generations: usize,
    pub population_size: usize,
    pub elite_count: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub archive_neighbors: usize,
    pub fitness_threshold: f64,
    pub archive_min_dissimilarity: f64,
    pub feasible_min: usize,
    pub feasible_max: usize,
}

impl RunConstants {
    pub fn new(evolution: &EvolutionConfig, novelty: &NoveltyConfig) -> Self {
        Self {
            individual_size: evolution.individual_size,
            generations: evolution.generations,
            population_size: evolution.population_size,
            elite_count: evolution.elite_count,
            crossover_probability: evolution.crossover_probability,
            mutation_probability: evolution.mutation_probability,
            archive_neighbors: novelty.archive_neighbors,
            fitness_threshold: novelty.fitness_threshold,
            archive_min_dissimilarity: novelty.archive_min_dissimilarity,
            feasible_min: novelty.feasible_min,
            feasible_max: novelty.feasible_max,
        }
    }
}

/// State of one generation after the merge step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub evaluator: EvaluatorMode,
    /// Feasible individuals counted by this generation's full evaluation
    pub feasible: usize,
    pub population: Vec<Individual>,
    pub archive: Vec<Sequence>,
    pub mean_cost: f64,
    pub mean_novelty: f64,
    pub archive_size: usize,
}

impl GenerationRecord {
    pub fn new(
        generation: usize,
        evaluator: EvaluatorMode,
        feasible: usize,
        population: Vec<Individual>,
        archive: Vec<Sequence>,
    ) -> Self {
        let n = population.len().max(1) as f64;
        let (cost_sum, novelty_sum) = population
            .iter()
            .filter_map(|ind| ind.fitness)
            .fold((0.0, 0.0), |(c, v), f| (c + f.cost, v + f.novelty));
        let archive_size = archive.len();
        Self {
            generation,
            evaluator,
            feasible,
            population,
            archive,
            mean_cost: cost_sum / n,
            mean_novelty: novelty_sum / n,
            archive_size,
        }
    }

    /// Lowest cost in the population
    pub fn best_cost(&self) -> Option<f64> {
        self.population
            .iter()
            .filter_map(|ind| ind.cost())
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Everything a run leaves behind, serialized as `stats.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Model identifier, filled in by the run service
    #[serde(default)]
    pub corpus: Option<String>,
    pub method: String,
    pub seed: u64,
    pub constants: RunConstants,
    pub started_at: DateTime<Utc>,
    pub generations: Vec<GenerationRecord>,
    pub elapsed_seconds: f64,
    /// SPEA2 selection from the final population
    pub pareto_front: Vec<Individual>,
}

impl RunStatistics {
    pub fn evaluator_trace(&self) -> Vec<EvaluatorMode> {
        self.generations.iter().map(|g| g.evaluator).collect()
    }

    pub fn mean_costs(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_cost).collect()
    }

    pub fn mean_novelties(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_novelty).collect()
    }

    pub fn archive_sizes(&self) -> Vec<usize> {
        self.generations.iter().map(|g| g.archive_size).collect()
    }

    pub fn final_population(&self) -> Option<&[Individual]> {
        self.generations.last().map(|g| g.population.as_slice())
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
