use super::traits::ConfigSection;
use crate::error::MotifError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovConfig {
    /// Number of orders built (orders 0..order_limit-1)
    pub order_limit: usize,
    /// Probability substituted for unseen contexts and transitions
    pub floor_probability: f64,
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self {
            order_limit: 6,
            floor_probability: 0.0001,
        }
    }
}

impl ConfigSection for MarkovConfig {
    fn section_name() -> &'static str {
        "markov"
    }

    fn validate(&self) -> Result<(), MotifError> {
        if self.order_limit == 0 {
            return Err(MotifError::Configuration(
                "Order limit must be at least 1".to_string()
            ));
        }
        if self.floor_probability <= 0.0 || self.floor_probability >= 1.0 {
            return Err(MotifError::Configuration(
                "Floor probability must be in (0, 1)".to_string()
            ));
        }
        Ok(())
    }
}
