use super::run_service::{create_model, run_ga, RunOutcome};
use crate::config::AppConfig;
use crate::engines::generation::NullProgressCallback;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One independent GA run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJob {
    pub corpus_id: String,
    pub seed: u64,
    pub method: String,
}

/// A corpus file and how its lines are tokenized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub name: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    " ".to_string()
}

/// Cartesian product of corpus files, seeds and methods, read from TOML:
///
/// ```toml
/// seeds = [7]
/// methods = ["multi_log_genotype"]
///
/// [[files]]
/// name = "bicinia"
/// separator = " "
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub files: Vec<CorpusFile>,
    pub seeds: Vec<u64>,
    pub methods: Vec<String>,
}

impl BatchPlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch plan {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse batch plan {}", path.display()))
    }

    /// Jobs in file, seed, method order; each model is `<name>_<seed>`.
    pub fn jobs(&self) -> Vec<RunJob> {
        let mut jobs = Vec::new();
        for file in &self.files {
            for &seed in &self.seeds {
                for method in &self.methods {
                    jobs.push(RunJob {
                        corpus_id: format!("{}_{}", file.name, seed),
                        seed,
                        method: method.clone(),
                    });
                }
            }
        }
        jobs
    }
}

/// Run jobs in parallel. Each result is independent: a failed job does not
/// stop the others.
pub fn run_batch(config: &AppConfig, jobs: &[RunJob]) -> Vec<(RunJob, Result<RunOutcome>)> {
    jobs.par_iter()
        .map(|job| {
            let outcome = run_ga(config, &job.corpus_id, job.seed, &job.method, NullProgressCallback)
                .with_context(|| format!("Run {} / {} / seed {} failed", job.corpus_id, job.method, job.seed));
            match &outcome {
                Ok(o) => log::info!("Finished {} -> {}", job.corpus_id, o.output_dir.display()),
                Err(e) => log::error!("{:#}", e),
            }
            (job.clone(), outcome)
        })
        .collect()
}

/// Build every model of the plan, then run all jobs.
pub fn run_plan(config: &AppConfig, plan: &BatchPlan) -> Result<Vec<(RunJob, Result<RunOutcome>)>> {
    for file in &plan.files {
        for &seed in &plan.seeds {
            create_model(&file.name, &file.separator, seed, config)
                .with_context(|| format!("Failed to build model for {} (seed {})", file.name, seed))?;
        }
    }

    let started = chrono::Utc::now();
    let results = run_batch(config, &plan.jobs());
    log::info!(
        "Batch of {} runs finished in {:.1}s ({} failed)",
        results.len(),
        (chrono::Utc::now() - started).num_milliseconds() as f64 / 1000.0,
        results.iter().filter(|(_, r)| r.is_err()).count()
    );
    Ok(results)
}
