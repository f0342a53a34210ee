use crate::config::{AppConfig, PathsConfig};
use crate::data::{CorpusLoader, CorpusModel, ModelStore};
use crate::engines::generation::{EvolutionEngine, ProgressCallback, RunStatistics};
use crate::error::{MotifError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STATS_FILE: &str = "stats.json";

/// Timestamp format of run output directories
pub const RUN_DIR_TIME_FORMAT: &str = "%Y%m%d-%H.%M.%S";

/// A finished run and where its statistics were written
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_dir: PathBuf,
    pub statistics: RunStatistics,
}

/// Build a model from `<corpus_dir>/<name>.txt` and save it to
/// `<models_dir>/<name>_<seed>/`. Returns the model directory.
pub fn create_model(name: &str, separator: &str, seed: u64, config: &AppConfig) -> Result<PathBuf> {
    let corpus_path = config.paths.corpus_dir.join(format!("{}.txt", name));
    let corpus = CorpusLoader::read_from_file(&corpus_path, separator)?;
    let model = CorpusModel::build(&corpus, config.markov.order_limit)?;

    let dir = model_dir(&config.paths, &format!("{}_{}", name, seed));
    if ModelStore::exists(&dir) {
        log::warn!("Overwriting existing model in {}", dir.display());
    }
    ModelStore::save(&dir, &model)?;
    Ok(dir)
}

pub fn model_dir(paths: &PathsConfig, corpus_id: &str) -> PathBuf {
    paths.models_dir.join(corpus_id)
}

/// Load the model `corpus_id`, run the GA and write `stats.json` under
/// `<output_dir>/<corpus_id>/<method>_<seed>_<timestamp>/`. A run finishing
/// in the same second as an identical one gets a `_<n>` suffix.
///
/// A missing model fails with [`MotifError::ModelNotFound`] before anything is written.
pub fn run_ga<C: ProgressCallback>(
    config: &AppConfig,
    corpus_id: &str,
    seed: u64,
    method: &str,
    callback: C,
) -> Result<RunOutcome> {
    let dir = model_dir(&config.paths, corpus_id);
    if !ModelStore::exists(&dir) {
        return Err(MotifError::ModelNotFound { path: dir });
    }
    let (table, alphabet) = ModelStore::load(&dir)?;

    let mut engine = EvolutionEngine::new(config, Arc::new(table), &alphabet, method, seed)?;
    let mut statistics = engine.run(callback)?;
    statistics.corpus = Some(corpus_id.to_string());

    let output_dir = create_run_dir(&config.paths.output_dir, corpus_id, method, seed)?;
    statistics.write_json(output_dir.join(STATS_FILE))?;
    log::info!("Statistics written to {}", output_dir.display());

    Ok(RunOutcome { output_dir, statistics })
}

/// Create a fresh run directory. `create_dir` fails on an existing path, so
/// concurrent runs with the same name each claim a distinct suffix.
fn create_run_dir(output_root: &Path, corpus_id: &str, method: &str, seed: u64) -> Result<PathBuf> {
    let parent = output_root.join(corpus_id);
    std::fs::create_dir_all(&parent)?;

    let base = format!("{}_{}_{}", method, seed, Local::now().format(RUN_DIR_TIME_FORMAT));
    let mut candidate = parent.join(&base);
    for n in 1.. {
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                log::debug!("Directory {} already exists", candidate.display());
                candidate = parent.join(format!("{}_{}", base, n));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(MotifError::Generation(format!(
        "No free run directory under {}",
        parent.display()
    )))
}
