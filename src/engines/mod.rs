pub mod markov;
pub mod novelty;
pub mod generation;
