//! Hybrid ensemble predictor

use crate::artifacts::ArtifactSet;
use crate::data::FeatureVector;
use crate::error::{GradecastError, Result};
use crate::models::Estimator;
use ndarray::{Array2, Axis};
use serde::Serialize;
use std::path::Path;

/// Predicted marks at or above this value count as a pass.
pub const PASS_THRESHOLD: f64 = 40.0;

/// One model's answer for a single prediction request.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    /// Registry name of the model
    pub model: String,
    /// Predicted final marks, rounded to 2 decimals
    pub predicted_marks: f64,
    /// Whether `predicted_marks` clears [`PASS_THRESHOLD`]
    pub pass: bool,
    /// The model's held-out R² recorded at training time
    pub r2: f64,
}

/// Stateless predictor over an immutable [`ArtifactSet`].
///
/// Constructed once per serving process; every prediction is a pure
/// function of the artifact set and the request vector.
#[derive(Debug, Clone)]
pub struct HybridPredictor {
    artifacts: ArtifactSet,
}

impl HybridPredictor {
    /// Wrap an artifact set, re-checking its cross-reference invariant.
    pub fn new(artifacts: ArtifactSet) -> Result<Self> {
        // ArtifactSet construction already validates, but the set may have
        // come from a stale directory on disk; refuse to serve rather
        // than guess
        if artifacts.top_models().is_empty() {
            return Err(GradecastError::ArtifactIntegrity(
                "top model list is empty".to_string(),
            ));
        }
        Ok(Self { artifacts })
    }

    /// Load the artifact directory and build a predictor.
    ///
    /// Fatal on any missing, corrupt, or inconsistent unit.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(ArtifactSet::load(dir)?)
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Query every trained model, in training order.
    pub fn predict_all(&self, features: &FeatureVector) -> Result<Vec<PredictionRecord>> {
        let scaled = self.scale(features)?;

        self.artifacts
            .models()
            .iter()
            .map(|(name, model)| {
                let marks = round2(model.predict(&scaled)?[0]);
                Ok(PredictionRecord {
                    model: name.clone(),
                    predicted_marks: marks,
                    pass: marks >= PASS_THRESHOLD,
                    r2: self.artifacts.score(name).unwrap_or(0.0),
                })
            })
            .collect()
    }

    /// Average the unrounded predictions of the top-K models, clamped to
    /// [0, 100] and rounded to 2 decimals.
    pub fn predict_hybrid(&self, features: &FeatureVector) -> Result<f64> {
        let scaled = self.scale(features)?;
        let top = self.artifacts.top_models();

        let mut sum = 0.0;
        for name in top {
            let model = self.artifacts.model(name).ok_or_else(|| {
                GradecastError::ArtifactIntegrity(format!(
                    "top model '{name}' is missing from the trained model set"
                ))
            })?;
            sum += model.predict(&scaled)?[0];
        }

        let mean = sum / top.len() as f64;
        Ok(round2(mean.clamp(0.0, 100.0)))
    }

    /// Standardize the request vector once, before any model runs.
    fn scale(&self, features: &FeatureVector) -> Result<Array2<f64>> {
        let row = self.artifacts.scaler().transform_row(&features.as_array())?;
        Ok(row.insert_axis(Axis(0)))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
