use serde::{Deserialize, Serialize};

/// Atomic symbol of a corpus alphabet
pub type Token = String;

/// Ordered list of tokens
pub type Sequence = Vec<Token>;

/// Dual objective of an individual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub cost: f64,    // Negative log-likelihood under the corpus model (minimize)
    pub novelty: f64, // Mean dissimilarity to selected neighbours (maximize)
}

impl Fitness {
    pub fn new(cost: f64, novelty: f64) -> Self {
        Self { cost, novelty }
    }

    pub fn objectives(&self) -> [f64; 2] {
        [self.cost, self.novelty]
    }
}

/// Candidate sequence under evolution. Genotype and phenotype are the same
/// token sequence; `fitness == None` marks an individual that must be
/// (re-)evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub sequence: Sequence,
    pub fitness: Option<Fitness>,
}

impl Individual {
    pub fn new(sequence: Sequence) -> Self {
        Self { sequence, fitness: None }
    }

    pub fn with_fitness(sequence: Sequence, fitness: Fitness) -> Self {
        Self { sequence, fitness: Some(fitness) }
    }

    pub fn is_valid(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    pub fn cost(&self) -> Option<f64> {
        self.fitness.map(|f| f.cost)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Build a sequence from string slices. Mostly useful in tests and demos.
pub fn sequence_of(tokens: &[&str]) -> Sequence {
    tokens.iter().map(|t| t.to_string()).collect()
}
