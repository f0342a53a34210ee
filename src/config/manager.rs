use super::{
    evolution::EvolutionConfig,
    markov::MarkovConfig,
    novelty::NoveltyConfig,
    paths::PathsConfig,
    traits::ConfigSection,
};
use crate::error::MotifError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variable prefix for layered configuration, e.g.
/// `MOTIF_EVOLUTION__GENERATIONS=100`.
pub const ENV_PREFIX: &str = "MOTIF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub novelty: NoveltyConfig,
    pub markov: MarkovConfig,
    pub paths: PathsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), MotifError> {
        self.evolution.validate()?;
        self.novelty.validate()?;
        self.markov.validate()?;
        self.paths.validate()?;
        if self.novelty.feasible_max > self.evolution.population_size {
            log::warn!(
                "{}.feasible_max ({}) exceeds population size ({}): novelty evaluation can never engage",
                NoveltyConfig::section_name(),
                self.novelty.feasible_max,
                self.evolution.population_size
            );
        }
        Ok(())
    }

    /// Defaults, then an optional TOML file, then `MOTIF_*` environment variables.
    pub fn load_layered<P: AsRef<Path>>(path: Option<P>) -> Result<Self, MotifError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn with_config(config: AppConfig) -> Result<Self, MotifError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MotifError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MotifError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| MotifError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MotifError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| MotifError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| MotifError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply `f` to a copy of the configuration; the change is kept only if
    /// the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), MotifError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::novelty::NeighborSelection;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = AppConfig::default();
        assert_eq!(config.evolution.individual_size, 50);
        assert_eq!(config.evolution.generations, 50);
        assert_eq!(config.evolution.population_size, 50);
        assert_eq!(config.evolution.elite_count, 5);
        assert_eq!(config.novelty.archive_neighbors, 5);
        assert_eq!(config.novelty.fitness_threshold, 455.0);
        assert_eq!(config.novelty.archive_min_dissimilarity, 0.5);
        assert_eq!(config.novelty.feasible_min, 35);
        assert_eq!(config.novelty.feasible_max, 45);
        assert_eq!(config.evolution.crossover_probability, 0.5);
        assert_eq!(config.evolution.mutation_probability, 0.35);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_rejects_invalid_and_keeps_previous() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.elite_count = 1000);
        assert!(result.is_err());
        assert_eq!(manager.get().evolution.elite_count, 5);

        manager.update(|c| c.evolution.generations = 7).unwrap();
        assert_eq!(manager.get().evolution.generations, 7);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motif.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| c.novelty.neighbor_selection = NeighborSelection::MostSimilar)
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        assert_eq!(reloaded.get(), manager.get());
    }

    #[test]
    fn test_layered_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layered.toml");
        std::fs::write(&path, "[evolution]\ngenerations = 12\n").unwrap();

        let config = AppConfig::load_layered(Some(&path)).unwrap();
        assert_eq!(config.evolution.generations, 12);
        assert_eq!(config.evolution.population_size, 50);
    }

    #[test]
    fn test_layered_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.toml");
        std::fs::write(&path, "[novelty]\ntournament_size = 3\n").unwrap();

        std::env::set_var("MOTIF_NOVELTY__TOURNAMENT_SIZE", "9");
        let config = AppConfig::load_layered(Some(&path));
        std::env::remove_var("MOTIF_NOVELTY__TOURNAMENT_SIZE");

        let config = config.unwrap();
        assert_eq!(config.novelty.tournament_size, 9);
        assert_eq!(config.novelty.neighbor_count, 4);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = AppConfig::default();
        config.novelty.feasible_min = 50;
        config.novelty.feasible_max = 10;
        assert!(matches!(config.validate(), Err(MotifError::Configuration(_))));
    }
}
