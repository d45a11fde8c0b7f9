//! The multi-model training pipeline

use crate::artifacts::ArtifactSet;
use crate::data::Dataset;
use crate::error::{GradecastError, Result};
use crate::models::{Estimator, ModelRegistry, TrainedModel};
use crate::preprocessing::StandardScaler;
use crate::training::{r2_score, TrainingConfig};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Trains every catalog model on a common scaled feature space, scores
/// each on a held-out partition, and selects the top-K ensemble.
#[derive(Debug, Clone, Default)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train the full registry catalog.
    pub fn train(&self, dataset: &Dataset) -> Result<ArtifactSet> {
        self.train_with_models(dataset, ModelRegistry::regressors())
    }

    /// Train an explicit catalog of named estimators.
    ///
    /// A single model's fit failure is absorbed: the failure is logged and
    /// the model is excluded from the artifact set and the ranking. The
    /// run only fails when no model trains at all.
    pub fn train_with_models(
        &self,
        dataset: &Dataset,
        catalog: Vec<(String, TrainedModel)>,
    ) -> Result<ArtifactSet> {
        let (train_idx, test_idx) = self.split_indices(dataset.n_rows())?;
        let train = dataset.select(&train_idx);
        let test = dataset.select(&test_idx);

        // Scaler statistics come from the training partition only
        let scaler = StandardScaler::fit(train.features())?;
        let x_train = scaler.transform(train.features())?;
        let x_test = scaler.transform(test.features())?;
        let y_train = train.targets();
        let y_test = test.targets();

        // Per-model fan-out; the order-preserving collect is the join
        // barrier before ranking
        let outcomes: Vec<(String, Option<(TrainedModel, f64)>)> = catalog
            .into_par_iter()
            .map(|(name, mut model)| {
                let result = model
                    .fit(&x_train, y_train)
                    .and_then(|_| model.predict(&x_test));
                match result {
                    Ok(preds) => {
                        let score = r2_score(y_test, &preds);
                        info!(model = %name, r2 = score, "scored model");
                        (name, Some((model, score)))
                    }
                    Err(err) => {
                        warn!(model = %name, error = %err, "model failed to train, excluding from ranking");
                        (name, None)
                    }
                }
            })
            .collect();

        let mut models = Vec::new();
        let mut scores = BTreeMap::new();
        for (name, outcome) in outcomes {
            if let Some((model, score)) = outcome {
                scores.insert(name.clone(), score);
                models.push((name, model));
            }
        }

        if models.is_empty() {
            return Err(GradecastError::Training(
                "every catalog model failed to train".to_string(),
            ));
        }

        // Stable descending sort: ties keep catalog order
        let mut ranked: Vec<(String, f64)> = models
            .iter()
            .map(|(name, _)| (name.clone(), scores[name]))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let top_models: Vec<String> = ranked
            .into_iter()
            .take(self.config.top_k)
            .map(|(name, _)| name)
            .collect();

        info!(top = ?top_models, "selected ensemble members");

        ArtifactSet::new(scaler, models, top_models, scores)
    }

    /// Deterministic shuffled split: returns (train, test) row indices.
    fn split_indices(&self, n_rows: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        if n_rows < 2 {
            return Err(GradecastError::InsufficientData(format!(
                "need at least 2 rows to split, got {n_rows}"
            )));
        }

        let test_fraction = 1.0 - self.config.split_ratio;
        let n_test = ((n_rows as f64) * test_fraction).ceil() as usize;

        if n_test == 0 {
            return Err(GradecastError::InsufficientData(
                "split ratio leaves the test partition empty".to_string(),
            ));
        }
        if n_test >= n_rows {
            return Err(GradecastError::InsufficientData(
                "split ratio leaves the training partition empty".to_string(),
            ));
        }

        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test_idx = indices[..n_test].to_vec();
        let train_idx = indices[n_test..].to_vec();
        Ok((train_idx, test_idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DecisionTreeRegressor;

    fn student_dataset() -> Dataset {
        Dataset::from_rows(&[
            ([1.0, 45.0, 22.0, 11.0], 35.0),
            ([2.0, 40.0, 20.0, 10.0], 40.0),
            ([3.0, 58.0, 28.0, 12.0], 47.0),
            ([4.0, 52.0, 24.0, 14.0], 52.0),
            ([5.0, 70.0, 33.0, 13.0], 58.0),
            ([6.0, 66.0, 30.0, 16.0], 64.0),
            ([7.0, 82.0, 38.0, 15.0], 71.0),
            ([8.0, 76.0, 35.0, 18.0], 77.0),
            ([9.0, 95.0, 44.0, 17.0], 84.0),
            ([10.0, 90.0, 41.0, 20.0], 92.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_split_is_deterministic() {
        let pipeline = TrainingPipeline::default();
        let (train_a, test_a) = pipeline.split_indices(10).unwrap();
        let (train_b, test_b) = pipeline.split_indices(10).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 8);
        assert_eq!(test_a.len(), 2);
    }

    #[test]
    fn test_split_rejects_tiny_dataset() {
        let pipeline = TrainingPipeline::default();
        assert!(matches!(
            pipeline.split_indices(1),
            Err(GradecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_split_rejects_empty_train_partition() {
        let pipeline = TrainingPipeline::new(TrainingConfig::new().with_split_ratio(0.0));
        assert!(matches!(
            pipeline.split_indices(10),
            Err(GradecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_train_produces_full_artifact_set() {
        let pipeline = TrainingPipeline::default();
        let artifacts = pipeline.train(&student_dataset()).unwrap();

        let n_catalog = ModelRegistry::names().len();
        assert_eq!(artifacts.models().len(), n_catalog);
        assert_eq!(artifacts.scores().len(), n_catalog);
        assert_eq!(artifacts.top_models().len(), 3);

        // Top list is sorted by descending held-out score
        let top_scores: Vec<f64> = artifacts
            .top_models()
            .iter()
            .map(|n| artifacts.score(n).unwrap())
            .collect();
        for pair in top_scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let pipeline = TrainingPipeline::default();
        let a = pipeline.train(&student_dataset()).unwrap();
        let b = pipeline.train(&student_dataset()).unwrap();

        assert_eq!(a.scores(), b.scores());
        assert_eq!(a.top_models(), b.top_models());
    }

    #[test]
    fn test_partial_failure_is_absorbed() {
        // A tree that demands more samples than the dataset has always
        // fails to fit; the pipeline continues with the remaining models
        let mut catalog = ModelRegistry::regressors();
        let poisoned = TrainedModel::DecisionTree(
            DecisionTreeRegressor::new().with_min_samples_split(10_000),
        );
        let slot = catalog
            .iter_mut()
            .find(|(name, _)| name == "Decision Tree")
            .unwrap();
        slot.1 = poisoned;

        let n_catalog = catalog.len();
        let pipeline = TrainingPipeline::default();
        let artifacts = pipeline
            .train_with_models(&student_dataset(), catalog)
            .unwrap();

        assert_eq!(artifacts.models().len(), n_catalog - 1);
        assert!(artifacts.model("Decision Tree").is_none());
        assert!(!artifacts
            .top_models()
            .iter()
            .any(|n| n == "Decision Tree"));
    }

    #[test]
    fn test_all_models_failing_is_fatal() {
        let catalog = vec![(
            "Decision Tree".to_string(),
            TrainedModel::DecisionTree(DecisionTreeRegressor::new().with_min_samples_split(10_000)),
        )];

        let pipeline = TrainingPipeline::default();
        assert!(matches!(
            pipeline.train_with_models(&student_dataset(), catalog),
            Err(GradecastError::Training(_))
        ));
    }

    #[test]
    fn test_top_k_shrinks_with_few_models() {
        let catalog: Vec<(String, TrainedModel)> = ModelRegistry::regressors()
            .into_iter()
            .take(2)
            .collect();

        let pipeline = TrainingPipeline::default();
        let artifacts = pipeline
            .train_with_models(&student_dataset(), catalog)
            .unwrap();
        assert_eq!(artifacts.top_models().len(), 2);
    }
}
