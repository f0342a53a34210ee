pub mod operators;
pub mod pareto;
pub mod evaluator;
pub mod evolution_engine;
pub mod statistics;
pub mod progress;

pub use evaluator::{AdaptiveSwitch, Evaluator, EvaluatorMode, FITNESS_ONLY_MARKER};
pub use evolution_engine::{EvolutionEngine, GenerationStep, PARETO_FRONT_SIZE};
pub use operators::{cx_two_point, mut_shuffle_indexes, random_individual};
pub use pareto::{dominates, spea2_select, OptimizationDirection, FITNESS_DIRECTIONS};
pub use progress::{ConsoleProgressCallback, GenerationSummary, NullProgressCallback, ProgressCallback};
pub use statistics::{GenerationRecord, RunConstants, RunStatistics};
