//! Evaluation metrics for thresholded binary predictions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Threshold raw network outputs into 0/1 class labels.
///
/// Values exactly at the cutoff count as the positive class.
pub fn threshold(raw: &Array1<f64>, cutoff: f64) -> Array1<f64> {
    raw.mapv(|v| if v >= cutoff { 1.0 } else { 0.0 })
}

/// Mean absolute error
pub fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Root mean squared error
pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// Evaluation snapshot of the model on test data
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Neurons in the model at evaluation time
    pub neurons: usize,
    /// Mean absolute error of thresholded predictions
    pub mae: f64,
    /// Root mean squared error of raw predictions
    pub rmse: f64,
    /// Fraction of thresholded predictions matching ground truth
    pub accuracy: f64,
    /// True positives
    pub tp: usize,
    /// False positives
    pub fp: usize,
    /// True negatives
    pub tn: usize,
    /// False negatives
    pub fn_: usize,
}

impl Evaluation {
    /// Evaluate raw predictions against ground truth at the given cutoff
    pub fn compute(
        y_true: &Array1<f64>,
        raw_pred: &Array1<f64>,
        cutoff: f64,
        neurons: usize,
    ) -> Self {
        let y_pred = threshold(raw_pred, cutoff);

        let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t >= cutoff, *p >= cutoff) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let total = y_true.len();
        let accuracy = if total == 0 {
            0.0
        } else {
            (tp + tn) as f64 / total as f64
        };

        Self {
            neurons,
            mae: mae(y_true, &y_pred),
            rmse: rmse(y_true, raw_pred),
            accuracy,
            tp,
            fp,
            tn,
            fn_,
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "neurons={} | mae={:.4} rmse={:.4} acc={:.1}% | tp={} fp={} tn={} fn={}",
            self.neurons,
            self.mae,
            self.rmse,
            100.0 * self.accuracy,
            self.tp,
            self.fp,
            self.tn,
            self.fn_
        )
    }
}
