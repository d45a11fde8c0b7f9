//! Fixed catalog of regression estimators

use crate::models::{
    DecisionTreeRegressor, GradientBoostingConfig, GradientBoostingRegressor, KnnRegressor,
    LinearRegression, RandomForestRegressor, SvrConfig, SvrRegressor, TrainedModel,
};

/// Seed shared by every stochastic estimator so repeated training on the
/// same data produces identical scores.
pub const DEFAULT_SEED: u64 = 42;

/// The fixed, ordered catalog of estimators the pipeline trains.
///
/// Entry names are the join key across the trained-model list, the score
/// map, and the top-K selection. Iteration order here defines the
/// presentation order at inference time and the tie-break order when two
/// models score equally.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Freshly constructed, unfitted estimators in catalog order.
    ///
    /// The XGBoost entry exists only when the `xgboost` cargo feature is
    /// compiled in; without it the catalog silently shrinks by one.
    pub fn regressors() -> Vec<(String, TrainedModel)> {
        let mut entries = vec![
            (
                "Linear Regression".to_string(),
                TrainedModel::LinearRegression(LinearRegression::new()),
            ),
            (
                "SVR".to_string(),
                TrainedModel::Svr(SvrRegressor::new(SvrConfig::default())),
            ),
            (
                "Decision Tree".to_string(),
                TrainedModel::DecisionTree(DecisionTreeRegressor::new()),
            ),
            (
                "Random Forest".to_string(),
                TrainedModel::RandomForest(
                    RandomForestRegressor::new(100).with_random_state(DEFAULT_SEED),
                ),
            ),
            (
                "Gradient Boosting".to_string(),
                TrainedModel::GradientBoosting(GradientBoostingRegressor::new(
                    GradientBoostingConfig {
                        random_state: DEFAULT_SEED,
                        ..Default::default()
                    },
                )),
            ),
        ];

        #[cfg(feature = "xgboost")]
        entries.push((
            "XGBoost".to_string(),
            TrainedModel::Xgb(crate::models::XgbRegressor::new(crate::models::XgbConfig {
                random_state: DEFAULT_SEED,
                ..Default::default()
            })),
        ));

        entries.push(("KNN".to_string(), TrainedModel::Knn(KnnRegressor::new(5))));

        entries
    }

    /// Catalog entry names, in order.
    pub fn names() -> Vec<String> {
        Self::regressors().into_iter().map(|(name, _)| name).collect()
    }
}
