use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotifError {
    #[error("Model not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Alphabet is empty: cannot construct individuals")]
    EmptyAlphabet,

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl MotifError {
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, MotifError::ModelNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, MotifError>;
