//! Standard (z-score) feature scaling

use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fits a [`ScalingModel`] from training features.
pub struct StandardScaler;

impl StandardScaler {
    /// Compute per-column mean and standard deviation.
    ///
    /// Columns with zero variance keep a scale of 1.0 so transforming
    /// them is the identity shift rather than a division by zero.
    pub fn fit(x: &Array2<f64>) -> Result<ScalingModel> {
        if x.nrows() == 0 {
            return Err(GradecastError::InsufficientData(
                "cannot fit a scaler on an empty feature matrix".to_string(),
            ));
        }

        let n = x.nrows() as f64;
        let means = x.mean_axis(Axis(0)).expect("non-empty matrix has a mean");

        let stds: Array1<f64> = x
            .axis_iter(Axis(1))
            .zip(means.iter())
            .map(|(col, &mean)| {
                let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std == 0.0 {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(ScalingModel {
            means: means.to_vec(),
            stds: stds.to_vec(),
        })
    }
}

/// Per-column standardization parameters learned from training data.
///
/// Immutable once fitted; the same instance transforms the training
/// partition, the held-out partition, and every inference vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingModel {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl ScalingModel {
    /// Number of feature columns this model was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Standardize a feature matrix: `(x - mean) / std` per column.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(x.ncols())?;

        let mut out = x.clone();
        for (mut col, (&mean, &std)) in out
            .axis_iter_mut(Axis(1))
            .zip(self.means.iter().zip(self.stds.iter()))
        {
            col.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(out)
    }

    /// Standardize a single feature row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>> {
        self.check_width(row.len())?;

        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&v, (&mean, &std))| (v - mean) / std)
            .collect())
    }

    fn check_width(&self, actual: usize) -> Result<()> {
        if actual != self.n_features() {
            return Err(GradecastError::DimensionMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }
}
