//! Dataset schema and loading
//!
//! The training input is a five-column table: four numeric features
//! (study hours, attendance percentage, internal marks, assignment score)
//! and the observed final marks as the regression target.

mod loader;
mod schema;

pub use loader::{dataset_from_frame, load_csv};
pub use schema::{Dataset, FeatureVector, FEATURE_COLUMNS, N_FEATURES, TARGET_COLUMN};
