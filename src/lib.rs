//! Gradecast - student result prediction engine
//!
//! Trains a catalog of regression models on student performance data
//! (study hours, attendance, internal marks, assignment score), scores
//! each on a held-out split, and blends the top performers into a single
//! hybrid prediction of the final marks.
//!
//! # Modules
//!
//! - [`data`] - Dataset schema and CSV loading
//! - [`preprocessing`] - Standardization fitted on training data only
//! - [`models`] - The regression estimators and the fixed model registry
//! - [`training`] - Split/scale/fit/score/rank pipeline
//! - [`artifacts`] - Durable artifact set bridging training and serving
//! - [`inference`] - Per-model predictions and the top-K hybrid score
//!
//! # Example
//!
//! ```no_run
//! use gradecast::prelude::*;
//!
//! # fn run() -> gradecast::Result<()> {
//! let dataset = gradecast::data::load_csv("student_data.csv")?;
//! let artifacts = TrainingPipeline::new(TrainingConfig::default()).train(&dataset)?;
//! artifacts.save("artifacts")?;
//!
//! let predictor = HybridPredictor::load("artifacts")?;
//! let request = FeatureVector::new(5.0, 75.0, 30.0, 15.0);
//! let hybrid = predictor.predict_hybrid(&request)?;
//! println!("predicted final marks: {hybrid:.2}");
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod cli;
pub mod data;
pub mod error;
pub mod inference;
pub mod models;
pub mod preprocessing;
pub mod training;

pub use error::{GradecastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::artifacts::ArtifactSet;
    pub use crate::data::{Dataset, FeatureVector};
    pub use crate::error::{GradecastError, Result};
    pub use crate::inference::{HybridPredictor, PredictionRecord, PASS_THRESHOLD};
    pub use crate::models::{Estimator, ModelRegistry, TrainedModel};
    pub use crate::preprocessing::{ScalingModel, StandardScaler};
    pub use crate::training::{TrainingConfig, TrainingPipeline};
}
