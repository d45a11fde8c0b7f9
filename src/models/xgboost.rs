//! Second-order gradient boosted trees (XGBoost-style)
//!
//! Differences from the plain gradient boosting module:
//! - uses gradient and hessian of the squared-error loss
//! - regularized leaf weights: w* = -G / (H + lambda)
//! - gain-based split scoring with an L2 penalty on leaf weights

use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// XGBoost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Minimum summed hessian per child
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum gain to keep a split (gamma)
    pub gamma: f64,
    /// Row subsample ratio per round
    pub subsample: f64,
    pub random_state: u64,
}

impl Default for XgbConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum XgbNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<XgbNode>,
        right: Box<XgbNode>,
    },
}

impl XgbNode {
    fn predict(&self, sample: &[f64]) -> f64 {
        match self {
            XgbNode::Leaf { weight } => *weight,
            XgbNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// XGBoost-style regressor (squared-error objective).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbRegressor {
    config: XgbConfig,
    trees: Vec<XgbNode>,
    base_score: f64,
}

impl XgbRegressor {
    pub fn new(config: XgbConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(GradecastError::Training(format!(
                "feature rows ({}) and target length ({}) disagree",
                n_samples,
                y.len()
            )));
        }
        if n_samples < 2 {
            return Err(GradecastError::Training(format!(
                "boosting needs at least 2 samples, got {n_samples}"
            )));
        }

        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        self.trees.clear();

        for _ in 0..self.config.n_estimators {
            // Squared error: grad = pred - y, hess = 1
            let grad: Array1<f64> = &preds - y;
            let hess = Array1::from_elem(n_samples, 1.0);

            let row_indices = subsample_rows(n_samples, self.config.subsample, &mut rng);

            let tree = build_tree(x, &grad, &hess, &row_indices, 0, &self.config);

            for i in 0..n_samples {
                let row = x.row(i);
                preds[i] += self.config.learning_rate
                    * tree.predict(row.as_slice().expect("row is contiguous"));
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(GradecastError::ModelNotFitted);
        }

        let mut preds = Array1::from_elem(x.nrows(), self.base_score);
        for (i, row) in x.rows().into_iter().enumerate() {
            let s = row.as_slice().expect("row is contiguous");
            for tree in &self.trees {
                preds[i] += self.config.learning_rate * tree.predict(s);
            }
        }
        Ok(preds)
    }
}

fn build_tree(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    depth: usize,
    config: &XgbConfig,
) -> XgbNode {
    let g_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = indices.iter().map(|&i| hess[i]).sum();

    let leaf_weight = -g_sum / (h_sum + config.reg_lambda);

    if depth >= config.max_depth || indices.len() < 2 || h_sum < config.min_child_weight {
        return XgbNode::Leaf { weight: leaf_weight };
    }

    let best_split = (0..x.ncols())
        .filter_map(|f| find_best_split(x, grad, hess, indices, f, config))
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    match best_split {
        Some((feature, threshold, gain)) if gain > config.gamma => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| x[[i, feature]] <= threshold);

            if left_idx.is_empty() || right_idx.is_empty() {
                return XgbNode::Leaf { weight: leaf_weight };
            }

            let left = build_tree(x, grad, hess, &left_idx, depth + 1, config);
            let right = build_tree(x, grad, hess, &right_idx, depth + 1, config);

            XgbNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => XgbNode::Leaf { weight: leaf_weight },
    }
}

/// Exact greedy split search on one feature.
fn find_best_split(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    feature: usize,
    config: &XgbConfig,
) -> Option<(usize, f64, f64)> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        x[[a, feature]]
            .partial_cmp(&x[[b, feature]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let g_total: f64 = sorted.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = sorted.iter().map(|&i| hess[i]).sum();
    let lambda = config.reg_lambda;

    let mut g_left = 0.0;
    let mut h_left = 0.0;
    let mut best: Option<(usize, f64, f64)> = None;

    for (pos, &idx) in sorted.iter().enumerate() {
        g_left += grad[idx];
        h_left += hess[idx];

        let Some(&next_idx) = sorted.get(pos + 1) else {
            break;
        };
        // Can't split between identical feature values
        if (x[[idx, feature]] - x[[next_idx, feature]]).abs() < 1e-12 {
            continue;
        }

        let g_right = g_total - g_left;
        let h_right = h_total - h_left;

        if h_left < config.min_child_weight || h_right < config.min_child_weight {
            continue;
        }

        let gain = 0.5
            * ((g_left * g_left) / (h_left + lambda) + (g_right * g_right) / (h_right + lambda)
                - (g_total * g_total) / (h_total + lambda));

        if best.map_or(true, |(_, _, g)| gain > g) {
            let threshold = (x[[idx, feature]] + x[[next_idx, feature]]) / 2.0;
            best = Some((feature, threshold, gain));
        }
    }

    best
}

fn subsample_rows(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let sample_size = ((n as f64) * ratio).ceil().max(2.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size);
    indices.sort_unstable();
    indices
}
