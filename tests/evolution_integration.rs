use motifsearch::config::AppConfig;
use motifsearch::engines::generation::{
    AdaptiveSwitch, EvaluatorMode, EvolutionEngine, GenerationSummary, NullProgressCallback,
    ProgressCallback,
};
use motifsearch::engines::markov::TransitionTable;
use motifsearch::error::MotifError;
use motifsearch::services::run_ga;
use motifsearch::types::{sequence_of, Sequence, Token};
use std::sync::Arc;

/// Simple progress callback for testing
#[derive(Default)]
struct TestProgressCallback {
    started: usize,
    completed: Vec<GenerationSummary>,
}

impl ProgressCallback for &mut TestProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {
        self.started += 1;
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary) {
        self.completed.push(summary.clone());
    }
}

fn corpus() -> Vec<Sequence> {
    vec![
        sequence_of(&["c", "d", "e", "c", "d", "e", "f", "g"]),
        sequence_of(&["g", "f", "e", "d", "c", "d", "e", "c"]),
        sequence_of(&["e", "e", "f", "g", "g", "f", "e", "d"]),
        sequence_of(&["c", "c", "d", "e", "c", "e", "d", "g"]),
    ]
}

fn alphabet() -> Vec<Token> {
    sequence_of(&["c", "d", "e", "f", "g"])
}

fn table() -> Arc<TransitionTable> {
    Arc::new(TransitionTable::build(&corpus(), 6).unwrap())
}

/// Small, fast configuration in which novelty evaluation engages quickly
fn small_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.evolution.individual_size = 12;
    config.evolution.population_size = 20;
    config.evolution.generations = 10;
    config.evolution.elite_count = 3;
    config.novelty.fitness_threshold = 5.0;
    config.novelty.feasible_min = 4;
    config.novelty.feasible_max = 10;
    config
}

#[test]
fn test_reference_size_run_keeps_population_size() {
    let config = AppConfig::default();
    assert_eq!(config.evolution.population_size, 50);
    assert_eq!(config.evolution.generations, 50);
    assert_eq!(config.evolution.elite_count, 5);

    let mut engine = EvolutionEngine::new(&config, table(), &alphabet(), "novelty", 7).unwrap();
    let mut callback = TestProgressCallback::default();
    let stats = engine.run(&mut callback).unwrap();

    assert_eq!(stats.generations.len(), 50);
    assert!(stats.generations.iter().all(|g| g.population.len() == 50));
    assert!(stats.generations.iter().flat_map(|g| &g.population).all(|i| i.len() == 50));
    assert_eq!(engine.population().len(), 50);
    assert_eq!(callback.started, 50);
    assert_eq!(callback.completed.len(), 50);
    assert_eq!(stats.pareto_front.len(), 7);
}

#[test]
fn test_elite_carried_over_unmodified() {
    let config = AppConfig::default();
    let mut engine = EvolutionEngine::new(&config, table(), &alphabet(), "novelty", 11).unwrap();

    for _ in 0..config.evolution.generations {
        let step = engine.step();
        assert_eq!(step.elite.len(), 5);
        assert!(step.elite.iter().all(|i| i.is_valid()));
        // The merged population starts with the elite, fitness included
        assert_eq!(&engine.population()[..5], step.elite.as_slice());
        assert_eq!(&step.record.population[..5], step.elite.as_slice());
        assert_eq!(engine.population().len(), 50);
    }
}

#[test]
fn test_merged_population_is_fully_evaluated() {
    let mut engine = EvolutionEngine::new(&small_config(), table(), &alphabet(), "novelty", 5).unwrap();
    for _ in 0..5 {
        let step = engine.step();
        assert!(step.record.population.iter().all(|i| i.is_valid()));
    }
}

#[test]
fn test_novelty_engages_and_archive_grows() {
    let config = small_config();
    let mut engine = EvolutionEngine::new(&config, table(), &alphabet(), "novelty", 3).unwrap();
    let stats = engine.run(NullProgressCallback).unwrap();

    let trace = stats.evaluator_trace();
    // Generation 0 has no previous feasible count
    assert_eq!(trace[0], EvaluatorMode::FitnessOnly);
    assert!(trace.contains(&EvaluatorMode::FitnessAndNovelty));
    assert!(!engine.archive().is_empty());

    let sizes = stats.archive_sizes();
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "archive never shrinks");
}

#[test]
fn test_fitness_only_method_never_switches() {
    let config = small_config();
    let mut engine =
        EvolutionEngine::new(&config, table(), &alphabet(), "multi_fitness_only", 3).unwrap();
    let stats = engine.run(NullProgressCallback).unwrap();

    assert!(stats.evaluator_trace().iter().all(|m| *m == EvaluatorMode::FitnessOnly));
    assert!(stats.mean_novelties().iter().all(|n| *n == 0.0));
    assert!(engine.archive().is_empty());
    // The population was feasible enough to switch otherwise
    assert!(stats.generations.iter().any(|g| g.feasible >= config.novelty.feasible_max));
}

#[test]
fn test_switch_sequence_with_thresholds() {
    let mut config = AppConfig::default();
    config.novelty.feasible_min = 35;
    config.novelty.feasible_max = 45;

    let mut switch = AdaptiveSwitch::for_method("novelty", &config.novelty);
    let modes: Vec<EvaluatorMode> = [10, 46, 46, 20].iter().map(|&f| switch.update(f)).collect();
    assert_eq!(
        modes,
        vec![
            EvaluatorMode::FitnessOnly,
            EvaluatorMode::FitnessAndNovelty,
            EvaluatorMode::FitnessAndNovelty,
            // 20 is at or below the lower threshold
            EvaluatorMode::FitnessOnly,
        ]
    );

    let mut switch = AdaptiveSwitch::for_method("novelty", &config.novelty);
    let modes: Vec<EvaluatorMode> = [10, 46, 40, 36, 44].iter().map(|&f| switch.update(f)).collect();
    assert_eq!(
        modes,
        vec![
            EvaluatorMode::FitnessOnly,
            EvaluatorMode::FitnessAndNovelty,
            EvaluatorMode::FitnessAndNovelty,
            EvaluatorMode::FitnessAndNovelty,
            EvaluatorMode::FitnessAndNovelty,
        ]
    );

    // Inside the band a fitness-only switch stays fitness-only
    let mut switch = AdaptiveSwitch::for_method("novelty", &config.novelty);
    assert_eq!(switch.update(40), EvaluatorMode::FitnessOnly);
}

#[test]
fn test_same_seed_same_run() {
    let config = small_config();
    let run = |seed: u64| {
        let mut engine = EvolutionEngine::new(&config, table(), &alphabet(), "novelty", seed).unwrap();
        engine.run(NullProgressCallback).unwrap()
    };

    let a = run(42);
    let b = run(42);
    assert_eq!(a.generations, b.generations);
    assert_eq!(a.pareto_front, b.pareto_front);

    let c = run(43);
    assert_ne!(a.generations, c.generations);
}

#[test]
fn test_empty_alphabet_is_fatal() {
    let result = EvolutionEngine::new(&small_config(), table(), &[], "novelty", 1);
    assert!(matches!(result, Err(MotifError::EmptyAlphabet)));
}

#[test]
fn test_invalid_configuration_rejected() {
    let mut config = small_config();
    config.evolution.elite_count = 15;
    let result = EvolutionEngine::new(&config, table(), &alphabet(), "novelty", 1);
    assert!(matches!(result, Err(MotifError::Configuration(_))));
}

#[test]
fn test_missing_model_aborts_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small_config();
    config.paths.models_dir = dir.path().join("models");
    config.paths.output_dir = dir.path().join("out");

    let err = run_ga(&config, "absent_7", 7, "novelty", NullProgressCallback).unwrap_err();
    assert!(err.is_model_not_found());
    assert!(!config.paths.output_dir.exists());
}
