//! Serving-side prediction over a loaded artifact set

mod predictor;

pub use predictor::{HybridPredictor, PredictionRecord, PASS_THRESHOLD};
