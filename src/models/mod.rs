//! Regression estimators and the model catalog
//!
//! Every estimator exposes the same `fit`/`predict` capability through
//! [`TrainedModel`]; adding an algorithm means adding a variant and a
//! registry entry, never branching on concrete types elsewhere.

pub mod decision_tree;
pub mod gradient_boosting;
pub mod knn;
pub mod linear;
pub mod random_forest;
mod registry;
pub mod svr;
#[cfg(feature = "xgboost")]
pub mod xgboost;

pub use decision_tree::DecisionTreeRegressor;
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use knn::KnnRegressor;
pub use linear::LinearRegression;
pub use random_forest::RandomForestRegressor;
pub use registry::{ModelRegistry, DEFAULT_SEED};
pub use svr::{Kernel, SvrConfig, SvrRegressor};
#[cfg(feature = "xgboost")]
pub use xgboost::{XgbConfig, XgbRegressor};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// The capability every registered estimator satisfies.
pub trait Estimator {
    /// Fit on scaled features and targets.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict targets for scaled features.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// A named estimator variant, unfitted when produced by the registry and
/// carrying its fitted parameters afterwards. All state is plain numeric
/// data, so artifacts reload into predict-capable models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    Svr(SvrRegressor),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
    #[cfg(feature = "xgboost")]
    Xgb(XgbRegressor),
    Knn(KnnRegressor),
}

impl Estimator for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedModel::LinearRegression(m) => m.fit(x, y),
            TrainedModel::Svr(m) => m.fit(x, y),
            TrainedModel::DecisionTree(m) => m.fit(x, y),
            TrainedModel::RandomForest(m) => m.fit(x, y),
            TrainedModel::GradientBoosting(m) => m.fit(x, y),
            #[cfg(feature = "xgboost")]
            TrainedModel::Xgb(m) => m.fit(x, y),
            TrainedModel::Knn(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::LinearRegression(m) => m.predict(x),
            TrainedModel::Svr(m) => m.predict(x),
            TrainedModel::DecisionTree(m) => m.predict(x),
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
            #[cfg(feature = "xgboost")]
            TrainedModel::Xgb(m) => m.predict(x),
            TrainedModel::Knn(m) => m.predict(x),
        }
    }
}
