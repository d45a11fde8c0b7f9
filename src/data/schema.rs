//! Core data types shared by training and inference

use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Feature columns, in the fixed order the models are trained on.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "Study_Hours",
    "Attendance_Percentage",
    "Internal_Marks",
    "Assignment_Score",
];

/// Target column name.
pub const TARGET_COLUMN: &str = "Final_Marks";

/// Number of input features.
pub const N_FEATURES: usize = FEATURE_COLUMNS.len();

/// One student's input features for a prediction request.
///
/// Field order matches [`FEATURE_COLUMNS`]; the advisory value ranges
/// (hours 0-12, attendance 0-100, internal 0-50, assignment 0-20) are
/// enforced by whatever collects the input, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub study_hours: f64,
    pub attendance_pct: f64,
    pub internal_marks: f64,
    pub assignment_score: f64,
}

impl FeatureVector {
    pub fn new(
        study_hours: f64,
        attendance_pct: f64,
        internal_marks: f64,
        assignment_score: f64,
    ) -> Self {
        Self {
            study_hours,
            attendance_pct,
            internal_marks,
            assignment_score,
        }
    }

    /// Feature values in training column order.
    pub fn as_array(&self) -> [f64; N_FEATURES] {
        [
            self.study_hours,
            self.attendance_pct,
            self.internal_marks,
            self.assignment_score,
        ]
    }
}

/// An in-memory training dataset: a feature matrix paired with targets.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl Dataset {
    /// Build a dataset from a feature matrix and target vector.
    pub fn new(features: Array2<f64>, targets: Array1<f64>) -> Result<Self> {
        if features.nrows() != targets.len() {
            return Err(GradecastError::Data(format!(
                "feature rows ({}) and target length ({}) disagree",
                features.nrows(),
                targets.len()
            )));
        }
        Ok(Self { features, targets })
    }

    /// Build a dataset from (features, final marks) rows.
    pub fn from_rows(rows: &[([f64; N_FEATURES], f64)]) -> Result<Self> {
        let features = Array2::from_shape_fn((rows.len(), N_FEATURES), |(r, c)| rows[r].0[c]);
        let targets = Array1::from_iter(rows.iter().map(|(_, y)| *y));
        Self::new(features, targets)
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    /// Copy out the rows named by `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        let features = self.features.select(ndarray::Axis(0), indices);
        let targets = Array1::from_iter(indices.iter().map(|&i| self.targets[i]));
        Dataset { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataset_shape_mismatch() {
        let features = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
        let targets = array![1.0];
        assert!(Dataset::new(features, targets).is_err());
    }

    #[test]
    fn test_from_rows() {
        let ds = Dataset::from_rows(&[([1.0, 80.0, 30.0, 15.0], 50.0), ([2.0, 90.0, 40.0, 18.0], 70.0)])
            .unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_features(), N_FEATURES);
        assert_eq!(ds.targets()[1], 70.0);
    }

    #[test]
    fn test_select_preserves_order() {
        let ds = Dataset::from_rows(&[
            ([1.0, 0.0, 0.0, 0.0], 1.0),
            ([2.0, 0.0, 0.0, 0.0], 2.0),
            ([3.0, 0.0, 0.0, 0.0], 3.0),
        ])
        .unwrap();
        let sub = ds.select(&[2, 0]);
        assert_eq!(sub.targets()[0], 3.0);
        assert_eq!(sub.targets()[1], 1.0);
    }

    #[test]
    fn test_feature_vector_order() {
        let v = FeatureVector::new(5.0, 75.0, 30.0, 15.0);
        assert_eq!(v.as_array(), [5.0, 75.0, 30.0, 15.0]);
    }
}
