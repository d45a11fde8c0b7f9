//! Offline training: split, scale, fit all catalog models, rank, select

mod config;
mod metrics;
mod pipeline;

pub use config::TrainingConfig;
pub use metrics::r2_score;
pub use pipeline::TrainingPipeline;
