//! Support vector regression (epsilon-insensitive loss)

use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Hard cap on the eager kernel matrix to avoid OOM on oversized input.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function for SVR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Gaussian RBF: K(x, y) = exp(-γ * ||x - y||²).
    /// `gamma: None` resolves to 1 / n_features at fit time.
    Rbf { gamma: Option<f64> },
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Rbf { gamma: None }
    }
}

/// SVR configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvrConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Width of the epsilon-insensitive tube
    pub epsilon: f64,
    /// Kernel function
    pub kernel: Kernel,
    /// Convergence tolerance
    pub tol: f64,
    /// Maximum training iterations
    pub max_iter: usize,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.1,
            kernel: Kernel::default(),
            tol: 1e-3,
            max_iter: 1000,
        }
    }
}

/// Support vector regressor trained by coordinate updates on the
/// epsilon-insensitive loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvrRegressor {
    config: SvrConfig,
    support_vectors: Option<Array2<f64>>,
    /// Combined alpha - alpha* per support vector
    alphas: Option<Array1<f64>>,
    bias: f64,
    /// Kernel gamma resolved at fit time
    gamma: f64,
}

impl SvrRegressor {
    pub fn new(config: SvrConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            alphas: None,
            bias: 0.0,
            gamma: 1.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();

        if n != y.len() {
            return Err(GradecastError::Training(format!(
                "feature rows ({}) and target length ({}) disagree",
                n,
                y.len()
            )));
        }
        if n == 0 {
            return Err(GradecastError::Training(
                "SVR needs at least one training sample".to_string(),
            ));
        }
        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(GradecastError::Training(format!(
                "dataset has {n} samples, exceeding the maximum {MAX_KERNEL_MATRIX_SAMPLES} for the SVR kernel matrix"
            )));
        }

        self.gamma = match self.config.kernel {
            Kernel::Linear => 0.0,
            Kernel::Rbf { gamma } => gamma.unwrap_or(1.0 / x.ncols() as f64),
        };

        let kernel_matrix = self.kernel_matrix(x);

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut alphas_star: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0f64;
        let learning_rate = 0.01f64;

        for _ in 0..self.config.max_iter {
            let mut max_change = 0.0f64;

            for i in 0..n {
                let mut pred = bias;
                for j in 0..n {
                    pred += (alphas[j] - alphas_star[j]) * kernel_matrix[[j, i]];
                }

                let error = pred - y[i];

                if error > self.config.epsilon {
                    let new_val = (alphas_star[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas_star[i]).abs());
                    alphas_star[i] = new_val;
                } else if error < -self.config.epsilon {
                    let new_val = (alphas[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas[i]).abs());
                    alphas[i] = new_val;
                }

                let bias_update = learning_rate * 0.1 * error;
                max_change = max_change.max(bias_update.abs());
                bias -= bias_update;
            }

            if max_change < self.config.tol {
                break;
            }
        }

        let combined = &alphas - &alphas_star;

        let support_indices: Vec<usize> = combined
            .iter()
            .enumerate()
            .filter(|(_, a)| a.abs() > 1e-8)
            .map(|(i, _)| i)
            .collect();

        if support_indices.is_empty() {
            // No support vectors within tolerance: keep all points
            self.support_vectors = Some(x.clone());
            self.alphas = Some(combined);
        } else {
            let support_vectors = x.select(ndarray::Axis(0), &support_indices);
            let support_alphas =
                Array1::from_iter(support_indices.iter().map(|&i| combined[i]));
            self.support_vectors = Some(support_vectors);
            self.alphas = Some(support_alphas);
        }

        self.bias = bias;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let sv = self
            .support_vectors
            .as_ref()
            .ok_or(GradecastError::ModelNotFitted)?;
        let alphas = self.alphas.as_ref().ok_or(GradecastError::ModelNotFitted)?;

        let predictions: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|sample| {
                let s = sample.as_slice().expect("row is contiguous");
                let mut sum = self.bias;
                for (j, sv_row) in sv.rows().into_iter().enumerate() {
                    sum += alphas[j]
                        * self.kernel(s, sv_row.as_slice().expect("row is contiguous"));
                }
                sum
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map_or(0, |sv| sv.nrows())
    }

    fn kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            let row_i = x.row(i);
            let a = row_i.as_slice().expect("row is contiguous");
            for j in i..n {
                let row_j = x.row(j);
                let val = self.kernel(a, row_j.as_slice().expect("row is contiguous"));
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    fn kernel(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.config.kernel {
            Kernel::Linear => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
            Kernel::Rbf { .. } => {
                let norm_sq: f64 = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| {
                        let d = x - y;
                        d * d
                    })
                    .sum();
                (-self.gamma * norm_sq).exp()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fits_within_tube() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

        let config = SvrConfig {
            c: 10.0,
            kernel: Kernel::Linear,
            max_iter: 5000,
            ..Default::default()
        };
        let mut svr = SvrRegressor::new(config);
        svr.fit(&x, &y).unwrap();

        let preds = svr.predict(&x).unwrap();
        let mae: f64 = preds
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).abs())
            .sum::<f64>()
            / y.len() as f64;
        assert!(mae < 1.5, "MAE too high: {mae}");
    }

    #[test]
    fn test_rbf_gamma_defaults_to_inverse_feature_count() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let y = array![0.0, 1.0, 2.0];

        let mut svr = SvrRegressor::new(SvrConfig::default());
        svr.fit(&x, &y).unwrap();
        assert_eq!(svr.gamma, 0.5);
    }

    #[test]
    fn test_predict_before_fit() {
        let svr = SvrRegressor::new(SvrConfig::default());
        assert!(matches!(
            svr.predict(&array![[1.0]]),
            Err(GradecastError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_deterministic() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];

        let mut a = SvrRegressor::new(SvrConfig::default());
        let mut b = SvrRegressor::new(SvrConfig::default());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }
}
