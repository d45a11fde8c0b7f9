//! Durable training artifacts
//!
//! The artifact set is the only channel between training and serving:
//! the fitted scaler, every trained model keyed by registry name, the
//! ordered top-K selection, and the held-out score per model. It persists
//! as four independently loadable JSON units; the serving side refuses to
//! start when any unit is absent, corrupt, or internally inconsistent.

use crate::error::{GradecastError, Result};
use crate::models::TrainedModel;
use crate::preprocessing::ScalingModel;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const SCALER_FILE: &str = "scaler.json";
const MODELS_FILE: &str = "models.json";
const TOP_MODELS_FILE: &str = "top_models.json";
const SCORES_FILE: &str = "scores.json";

/// Immutable bundle produced by a training run.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    scaler: ScalingModel,
    /// Trained models in registry/training order
    models: Vec<(String, TrainedModel)>,
    /// Ensemble membership, best score first
    top_models: Vec<String>,
    /// Held-out R² per trained model
    scores: BTreeMap<String, f64>,
}

impl ArtifactSet {
    /// Assemble an artifact set, enforcing the cross-reference invariant.
    pub fn new(
        scaler: ScalingModel,
        models: Vec<(String, TrainedModel)>,
        top_models: Vec<String>,
        scores: BTreeMap<String, f64>,
    ) -> Result<Self> {
        let set = Self {
            scaler,
            models,
            top_models,
            scores,
        };
        set.validate()?;
        Ok(set)
    }

    /// Check that every top-K name and every score key resolves to a
    /// trained model, and that no name is selected twice.
    fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(GradecastError::ArtifactIntegrity(
                "artifact set contains no trained models".to_string(),
            ));
        }

        for name in &self.top_models {
            if self.model(name).is_none() {
                return Err(GradecastError::ArtifactIntegrity(format!(
                    "top model '{name}' is missing from the trained model set"
                )));
            }
        }

        let mut seen = self.top_models.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.top_models.len() {
            return Err(GradecastError::ArtifactIntegrity(
                "top model list contains a duplicate name".to_string(),
            ));
        }

        for name in self.scores.keys() {
            if self.model(name).is_none() {
                return Err(GradecastError::ArtifactIntegrity(format!(
                    "scored model '{name}' is missing from the trained model set"
                )));
            }
        }

        Ok(())
    }

    pub fn scaler(&self) -> &ScalingModel {
        &self.scaler
    }

    /// Trained models in training order.
    pub fn models(&self) -> &[(String, TrainedModel)] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&TrainedModel> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    /// Ensemble member names, best score first.
    pub fn top_models(&self) -> &[String] {
        &self.top_models
    }

    pub fn scores(&self) -> &BTreeMap<String, f64> {
        &self.scores
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }

    /// Write all four units into `dir`, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        write_json(&dir.join(SCALER_FILE), &self.scaler)?;
        write_json(&dir.join(MODELS_FILE), &self.models)?;
        write_json(&dir.join(TOP_MODELS_FILE), &self.top_models)?;
        write_json(&dir.join(SCORES_FILE), &self.scores)?;
        Ok(())
    }

    /// Load all four units from `dir` and re-validate.
    ///
    /// Any missing or unparseable unit is an error; callers on the serving
    /// side must treat it as fatal rather than degrade.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let scaler: ScalingModel = read_json(&dir.join(SCALER_FILE))?;
        let models: Vec<(String, TrainedModel)> = read_json(&dir.join(MODELS_FILE))?;
        let top_models: Vec<String> = read_json(&dir.join(TOP_MODELS_FILE))?;
        let scores: BTreeMap<String, f64> = read_json(&dir.join(SCORES_FILE))?;

        Self::new(scaler, models, top_models, scores)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Estimator, KnnRegressor};
    use crate::preprocessing::StandardScaler;
    use ndarray::array;

    fn small_artifacts() -> ArtifactSet {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let y = array![40.0, 50.0, 60.0];
        let scaler = StandardScaler::fit(&x).unwrap();

        let mut knn = TrainedModel::Knn(KnnRegressor::new(2));
        knn.fit(&scaler.transform(&x).unwrap(), &y).unwrap();

        let mut scores = BTreeMap::new();
        scores.insert("KNN".to_string(), 0.9);

        ArtifactSet::new(
            scaler,
            vec![("KNN".to_string(), knn)],
            vec!["KNN".to_string()],
            scores,
        )
        .unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let artifacts = small_artifacts();
        let dir = tempfile::tempdir().unwrap();
        artifacts.save(dir.path()).unwrap();

        let reloaded = ArtifactSet::load(dir.path()).unwrap();
        assert_eq!(reloaded.top_models(), artifacts.top_models());
        assert_eq!(reloaded.scores(), artifacts.scores());
        assert_eq!(reloaded.scaler(), artifacts.scaler());

        // Reloaded models reproduce predictions exactly
        let scaled = artifacts.scaler().transform(&array![[2.0, 20.0]]).unwrap();
        let before = artifacts.model("KNN").unwrap().predict(&scaled).unwrap();
        let after = reloaded.model("KNN").unwrap().predict(&scaled).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_missing_unit_is_fatal() {
        let artifacts = small_artifacts();
        let dir = tempfile::tempdir().unwrap();
        artifacts.save(dir.path()).unwrap();

        fs::remove_file(dir.path().join(SCORES_FILE)).unwrap();
        assert!(matches!(
            ArtifactSet::load(dir.path()),
            Err(GradecastError::Io(_))
        ));
    }

    #[test]
    fn test_corrupt_unit_is_fatal() {
        let artifacts = small_artifacts();
        let dir = tempfile::tempdir().unwrap();
        artifacts.save(dir.path()).unwrap();

        fs::write(dir.path().join(MODELS_FILE), "{not json").unwrap();
        assert!(matches!(
            ArtifactSet::load(dir.path()),
            Err(GradecastError::Serialization(_))
        ));
    }

    #[test]
    fn test_unknown_top_model_fails_integrity() {
        let artifacts = small_artifacts();
        let dir = tempfile::tempdir().unwrap();
        artifacts.save(dir.path()).unwrap();

        write_json(
            &dir.path().join(TOP_MODELS_FILE),
            &vec!["Random Forest".to_string()],
        )
        .unwrap();

        assert!(matches!(
            ArtifactSet::load(dir.path()),
            Err(GradecastError::ArtifactIntegrity(_))
        ));
    }

    #[test]
    fn test_duplicate_top_model_fails_integrity() {
        let base = small_artifacts();
        let result = ArtifactSet::new(
            base.scaler.clone(),
            base.models.clone(),
            vec!["KNN".to_string(), "KNN".to_string()],
            base.scores.clone(),
        );
        assert!(matches!(
            result,
            Err(GradecastError::ArtifactIntegrity(_))
        ));
    }
}
