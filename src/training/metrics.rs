//! Regression evaluation metrics

use ndarray::Array1;

/// Coefficient of determination.
///
/// 1.0 is a perfect fit; negative values mean the model does worse than
/// predicting the target mean. Returns 0.0 when the targets are constant
/// (no variance to explain).
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }

    let y_mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_fit() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&y, &y), 1.0);
    }

    #[test]
    fn test_mean_baseline_is_zero() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![2.5, 2.5, 2.5, 2.5];
        assert!(r2_score(&y_true, &y_pred).abs() < 1e-12);
    }

    #[test]
    fn test_worse_than_mean_is_negative() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![10.0, -5.0, 8.0];
        assert!(r2_score(&y_true, &y_pred) < 0.0);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![5.0, 5.0, 5.0];
        let y_pred = array![4.0, 5.0, 6.0];
        assert_eq!(r2_score(&y_true, &y_pred), 0.0);
    }
}
