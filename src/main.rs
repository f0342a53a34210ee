use anyhow::{bail, Context, Result};
use motifsearch::config::AppConfig;
use motifsearch::data::ModelStore;
use motifsearch::engines::generation::ConsoleProgressCallback;
use motifsearch::engines::markov::SequenceSampler;
use motifsearch::services::{self, BatchPlan};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "motifsearch.toml";

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [arguments]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  model <name> [separator] [seed]      Build <corpus_dir>/<name>.txt into <models_dir>/<name>_<seed>");
    eprintln!("  run <model> <seed> <method>          Run the GA on a saved model");
    eprintln!("  batch <plan.toml>                    Build models and run every (file, seed, method) in parallel");
    eprintln!("  generate <model> [count] [length]    Sample sequences from a saved model");
    eprintln!();
    eprintln!("Configuration is read from $MOTIF_CONFIG or ./{}, then MOTIF_* variables.", DEFAULT_CONFIG);
    eprintln!("A method containing \"fitness_only\" disables novelty evaluation.");
}

fn load_config() -> Result<AppConfig> {
    let path = std::env::var_os("MOTIF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    AppConfig::load_layered(Some(&path))
        .with_context(|| format!("Failed to load configuration ({})", path.display()))
}

fn parse_seed(arg: Option<&String>, default: u64) -> Result<u64> {
    match arg {
        Some(s) => s.parse().with_context(|| format!("Invalid seed '{}'", s)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("motifsearch");
    let Some(command) = args.get(1) else {
        print_usage(program);
        std::process::exit(1);
    };

    let config = load_config()?;

    match command.as_str() {
        "model" => {
            let name = args.get(2).context("Missing corpus name")?;
            let separator = args.get(3).map(String::as_str).unwrap_or(" ");
            let seed = parse_seed(args.get(4), 0)?;
            let dir = services::create_model(name, separator, seed, &config)
                .with_context(|| format!("Failed to build model for '{}'", name))?;
            println!("Model written to {}", dir.display());
        }
        "run" => {
            let corpus_id = args.get(2).context("Missing model name")?;
            let seed = parse_seed(args.get(3), 0)?;
            let method = args.get(4).context("Missing method name")?;
            let outcome = services::run_ga(&config, corpus_id, seed, method, ConsoleProgressCallback)
                .with_context(|| format!("Run on '{}' failed", corpus_id))?;
            println!(
                "Finished in {:.2}s, statistics in {}",
                outcome.statistics.elapsed_seconds,
                outcome.output_dir.display()
            );
        }
        "batch" => {
            let plan_path = args.get(2).context("Missing batch plan")?;
            let plan = BatchPlan::from_file(plan_path)?;
            let results = services::run_plan(&config, &plan)?;
            let failed = results.iter().filter(|(_, r)| r.is_err()).count();
            println!("{} runs, {} failed", results.len(), failed);
            if failed > 0 {
                bail!("{} of {} runs failed", failed, results.len());
            }
        }
        "generate" => {
            let corpus_id = args.get(2).context("Missing model name")?;
            let count: usize = args.get(3).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(10);
            let length: usize = args.get(4).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(16);
            let (table, _) = ModelStore::load(services::model_dir(&config.paths, corpus_id))?;
            let mut sampler = SequenceSampler::new(&table, length, StdRng::from_entropy());
            for sequence in sampler.generate(count) {
                println!("{}", sequence.join(" "));
            }
        }
        other => {
            print_usage(program);
            bail!("Unknown command '{}'", other);
        }
    }

    Ok(())
}
