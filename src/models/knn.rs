//! K-Nearest Neighbors regressor

use crate::error::{GradecastError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// KNN regression: prediction is the mean target of the k nearest
/// training rows under Euclidean distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnRegressor {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    /// Fit stores the training data; KNN is a lazy learner.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(GradecastError::Training(format!(
                "feature rows ({}) and target length ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(GradecastError::Training(
                "KNN needs at least one training sample".to_string(),
            ));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(GradecastError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(GradecastError::ModelNotFitted)?;
        let k = self.n_neighbors.min(x_train.nrows());

        let predictions: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let point = row.as_slice().expect("row is contiguous");
                let neighbors = find_k_nearest(point, x_train, y_train, k);
                neighbors.iter().map(|(_, y)| y).sum::<f64>() / neighbors.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

/// Max-heap entry so the heap root is the farthest of the kept neighbors.
#[derive(PartialEq)]
struct DistTarget(f64, f64);

impl Eq for DistTarget {}
impl PartialOrd for DistTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Keep the k smallest distances with a bounded max-heap: O(n log k).
fn find_k_nearest(point: &[f64], x_train: &Array2<f64>, y_train: &Array1<f64>, k: usize) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(point, row.as_slice().expect("row is contiguous"));
        if heap.len() < k {
            heap.push(DistTarget(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistTarget(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dt| (dt.0, dt.1)).collect()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_predicts_neighborhood_mean() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]];
        let y = array![10.0, 20.0, 30.0, 70.0, 80.0, 90.0];

        let mut knn = KnnRegressor::new(3);
        knn.fit(&x, &y).unwrap();

        let preds = knn.predict(&array![[1.0], [11.0]]).unwrap();
        assert!((preds[0] - 20.0).abs() < 1e-10);
        assert!((preds[1] - 80.0).abs() < 1e-10);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let x = array![[0.0], [1.0]];
        let y = array![40.0, 40.0];

        let mut knn = KnnRegressor::new(5);
        knn.fit(&x, &y).unwrap();

        let preds = knn.predict(&array![[0.5]]).unwrap();
        assert_eq!(preds[0], 40.0);
    }

    #[test]
    fn test_euclidean_distance() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KnnRegressor::new(3);
        assert!(matches!(
            knn.predict(&array![[1.0]]),
            Err(GradecastError::ModelNotFitted)
        ));
    }
}
