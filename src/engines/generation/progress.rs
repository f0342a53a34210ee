use super::evaluator::EvaluatorMode;

/// Per-generation figures handed to progress callbacks
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub total_generations: usize,
    pub evaluator: EvaluatorMode,
    pub feasible: usize,
    pub mean_cost: f64,
    pub best_cost: f64,
    pub mean_novelty: f64,
    pub archive_size: usize,
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, summary: &GenerationSummary);
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) {
        log::info!(
            "Generation {}/{} [{}] feasible={} mean cost={:.2} best cost={:.2} mean novelty={:.4} archive={}",
            summary.generation + 1,
            summary.total_generations,
            summary.evaluator,
            summary.feasible,
            summary.mean_cost,
            summary.best_cost,
            summary.mean_novelty,
            summary.archive_size
        );
    }
}

/// Discards progress; used by batch runs and tests
pub struct NullProgressCallback;

impl ProgressCallback for NullProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _summary: &GenerationSummary) {}
}
