use super::traits::{check_probability, ConfigSection};
use crate::error::MotifError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub individual_size: usize,
    pub generations: usize,
    pub population_size: usize,
    pub elite_count: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub shuffle_index_probability: f64, // Per-position swap chance inside a mutation
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            individual_size: 50,
            generations: 50,
            population_size: 50,
            elite_count: 5,
            crossover_probability: 0.5,
            mutation_probability: 0.35,
            shuffle_index_probability: 0.5,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MotifError> {
        if self.individual_size == 0 {
            return Err(MotifError::Configuration(
                "Individual size must be at least 1".to_string()
            ));
        }
        if self.population_size == 0 {
            return Err(MotifError::Configuration(
                "Population size must be at least 1".to_string()
            ));
        }
        // Selection keeps population_size - elite_count survivors, the elite included
        if self.elite_count * 2 > self.population_size {
            return Err(MotifError::Configuration(format!(
                "Elite count ({}) cannot exceed half the population size ({})",
                self.elite_count, self.population_size
            )));
        }
        check_probability("Crossover probability", self.crossover_probability)?;
        check_probability("Mutation probability", self.mutation_probability)?;
        check_probability("Shuffle index probability", self.shuffle_index_probability)?;
        Ok(())
    }
}
