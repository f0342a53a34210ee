//! End-to-end runs on top of the engines: model creation, single GA runs and
//! parallel batches.

pub mod run_service;
pub mod batch;

pub use batch::{run_batch, run_plan, BatchPlan, CorpusFile, RunJob};
pub use run_service::{create_model, model_dir, run_ga, RunOutcome, STATS_FILE};
