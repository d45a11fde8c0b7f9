//! Training configuration

use serde::{Deserialize, Serialize};

/// Configuration for a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows kept for training; the rest are held out for scoring.
    pub split_ratio: f64,

    /// Seed for the train/test shuffle.
    pub seed: u64,

    /// Ensemble size: how many top-ranked models the hybrid prediction averages.
    pub top_k: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            split_ratio: 0.8,
            seed: 42,
            top_k: 3,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split_ratio(mut self, ratio: f64) -> Self {
        self.split_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.split_ratio, 0.8);
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn test_builder() {
        let config = TrainingConfig::new().with_split_ratio(0.7).with_seed(7).with_top_k(2);
        assert_eq!(config.split_ratio, 0.7);
        assert_eq!(config.seed, 7);
        assert_eq!(config.top_k, 2);
    }
}
