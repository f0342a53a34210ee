pub mod traits;
pub mod evolution;
pub mod novelty;
pub mod markov;
pub mod paths;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use novelty::NoveltyConfig;
pub use markov::MarkovConfig;
pub use paths::PathsConfig;
pub use traits::ConfigSection;
