use super::traits::ConfigSection;
use crate::engines::novelty::NeighborSelection;
use crate::error::MotifError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoveltyConfig {
    /// Number of closest archive members averaged by the admission test
    pub archive_neighbors: usize,
    /// Cost above which an individual counts as feasible and may enter the archive
    pub fitness_threshold: f64,
    /// Minimum mean dissimilarity to the archive required for admission
    pub archive_min_dissimilarity: f64,
    /// Feasible count at or below which the engine falls back to fitness-only evaluation
    pub feasible_min: usize,
    /// Feasible count at or above which the engine switches to fitness+novelty
    pub feasible_max: usize,
    pub neighbor_count: usize,
    pub tournament_size: usize,
    pub neighbor_selection: NeighborSelection,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            archive_neighbors: 5,
            fitness_threshold: 455.0,
            archive_min_dissimilarity: 0.5,
            feasible_min: 35,
            feasible_max: 45,
            neighbor_count: 4,
            tournament_size: 5,
            neighbor_selection: NeighborSelection::default(),
        }
    }
}

impl ConfigSection for NoveltyConfig {
    fn section_name() -> &'static str {
        "novelty"
    }

    fn validate(&self) -> Result<(), MotifError> {
        if self.archive_neighbors == 0 {
            return Err(MotifError::Configuration(
                "Archive neighbours must be at least 1".to_string()
            ));
        }
        if self.feasible_min > self.feasible_max {
            return Err(MotifError::Configuration(format!(
                "Feasible min ({}) must not exceed feasible max ({})",
                self.feasible_min, self.feasible_max
            )));
        }
        if self.neighbor_count == 0 || self.tournament_size == 0 {
            return Err(MotifError::Configuration(
                "Neighbour count and tournament size must be positive".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.archive_min_dissimilarity) {
            return Err(MotifError::Configuration(
                "Archive min dissimilarity must be between 0 and 1".to_string()
            ));
        }
        Ok(())
    }
}
