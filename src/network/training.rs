//! Batch gradient training for the fuzzy network.
//!
//! Full-batch gradient descent on all three parameter matrices against a
//! mean-squared-error loss, run until the loss change falls below the
//! configured tolerance or the epoch budget runs out.

use super::model::FuzzyNetwork;
use crate::config::TrainingConfig;
use log::warn;
use ndarray::{Array1, Array2};

/// Outcome of one training run
#[derive(Clone, Debug)]
pub struct TrainingSummary {
    /// Epochs actually run
    pub epochs: usize,
    /// Final mean-squared-error on the training data
    pub final_loss: f64,
    /// Whether the loss change dropped below tolerance
    pub converged: bool,
    /// Whether an update went non-finite and was rolled back
    pub diverged: bool,
}

impl FuzzyNetwork {
    /// Fit all parameters on the training data.
    ///
    /// Blocking; returns when the loss converges or the epoch budget is
    /// exhausted. Widths are clamped to the configured floor after every
    /// update so the membership functions stay well-defined. If the loss
    /// or any parameter goes non-finite, the step is rolled back to the
    /// last finite parameters and training stops early; the network never
    /// ends up holding NaN or infinite values.
    pub fn train_to_convergence(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        config: &TrainingConfig,
    ) -> TrainingSummary {
        debug_assert_eq!(x.nrows(), y.len());
        let samples = x.nrows();
        let features = self.features();
        let neurons = self.neurons();
        let lr = config.learning_rate;
        let min_width = self.min_width();

        let mut prev_loss = f64::INFINITY;
        let mut loss = f64::INFINITY;
        let mut epochs = 0;
        let mut converged = false;
        let mut diverged = false;

        // parameters from the last epoch whose loss was finite
        let mut last_good: Option<(Array2<f64>, Array2<f64>, Array2<f64>)> = None;

        for epoch in 1..=config.max_epochs {
            epochs = epoch;

            let (c, s, a) = self.parameters();
            let phi = self.firing(x);
            let sums: Vec<f64> = phi.rows().into_iter().map(|r| r.sum()).collect();

            // per-rule linear local models: (samples, neurons)
            let mut local = Array2::zeros((samples, neurons));
            for n in 0..samples {
                for j in 0..neurons {
                    let mut w = a[[0, j]];
                    for f in 0..features {
                        w += a[[1 + f, j]] * x[[n, f]];
                    }
                    local[[n, j]] = w;
                }
            }

            let mut y_hat = Array1::zeros(samples);
            for n in 0..samples {
                let sum = sums[n].max(f64::MIN_POSITIVE);
                let mut out = 0.0;
                for j in 0..neurons {
                    out += phi[[n, j]] / sum * local[[n, j]];
                }
                y_hat[n] = out;
            }

            loss = y_hat
                .iter()
                .zip(y.iter())
                .map(|(p, t)| (p - t) * (p - t))
                .sum::<f64>()
                / samples as f64;

            if !loss.is_finite() {
                warn!("loss went non-finite at epoch {epoch}; rolling back last update");
                if let Some((c0, s0, a0)) = last_good.take() {
                    *self.centers_mut() = c0;
                    *self.widths_mut() = s0;
                    *self.weights_mut() = a0;
                }
                loss = prev_loss;
                diverged = true;
                break;
            }
            if (prev_loss - loss).abs() < config.tolerance {
                converged = true;
                break;
            }
            prev_loss = loss;

            // accumulate gradients
            let mut grad_c: Array2<f64> = Array2::zeros((features, neurons));
            let mut grad_s: Array2<f64> = Array2::zeros((features, neurons));
            let mut grad_a: Array2<f64> = Array2::zeros((1 + features, neurons));

            for n in 0..samples {
                let g = 2.0 * (y_hat[n] - y[n]) / samples as f64;
                let sum = sums[n].max(f64::MIN_POSITIVE);

                for j in 0..neurons {
                    let psi = phi[[n, j]] / sum;

                    // consequent weights
                    grad_a[[0, j]] += g * psi;
                    for f in 0..features {
                        grad_a[[1 + f, j]] += g * psi * x[[n, f]];
                    }

                    // rule parameters, through the normalization layer
                    let t = g * (local[[n, j]] - y_hat[n]) / sum * phi[[n, j]];
                    for f in 0..features {
                        let d = x[[n, f]] - c[[f, j]];
                        let w = s[[f, j]];
                        grad_c[[f, j]] += t * d / (w * w);
                        grad_s[[f, j]] += t * d * d / (w * w * w);
                    }
                }
            }

            {
                let centers = self.centers_mut();
                *centers = &*centers - &(grad_c * lr);
            }
            {
                let widths = self.widths_mut();
                *widths = &*widths - &(grad_s * lr);
                widths.mapv_inplace(|v| v.max(min_width));
            }
            {
                let weights = self.weights_mut();
                *weights = &*weights - &(grad_a * lr);
            }

            if !self.is_valid() {
                warn!("parameters went non-finite at epoch {epoch}; rolling back update");
                *self.centers_mut() = c;
                *self.widths_mut() = s;
                *self.weights_mut() = a;
                diverged = true;
                break;
            }
            last_good = Some((c, s, a));
        }

        TrainingSummary {
            epochs,
            final_loss: loss,
            converged,
            diverged,
        }
    }
}
