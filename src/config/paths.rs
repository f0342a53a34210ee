use super::traits::ConfigSection;
use crate::error::MotifError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub corpus_dir: PathBuf,
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            models_dir: PathBuf::from("data/models"),
            output_dir: PathBuf::from("data/out"),
        }
    }
}

impl ConfigSection for PathsConfig {
    fn section_name() -> &'static str {
        "paths"
    }

    fn validate(&self) -> Result<(), MotifError> {
        if self.models_dir.as_os_str().is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(MotifError::Configuration(
                "Model and output directories must be set".to_string()
            ));
        }
        Ok(())
    }
}
