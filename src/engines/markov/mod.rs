//! Multi-order Markov corpus model: table construction, likelihood scoring
//! and corpus-consistent generation.

pub mod table;
pub mod scorer;
pub mod sampler;

pub use table::{
    context_key, ngram_occurrences, most_frequent, split_context, transition_occurrences,
    Distribution, OrderTable, TraceStep, TransitionTable, CONTEXT_SEPARATOR,
};
pub use scorer::{LikelihoodScorer, FLOOR_PROBABILITY};
pub use sampler::{generate_per_order, monte_carlo_choice, sample_distribution, SequenceSampler, StartPolicy};
