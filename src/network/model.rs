//! Fuzzy network structure and forward propagation.

use crate::config::NetworkConfig;
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The five-layer fuzzy-rule model.
///
/// Parameters are held as parallel column-per-neuron matrices:
/// - `centers`: (features, neurons) membership centers
/// - `widths`:  (features, neurons) membership widths
/// - `weights`: (1 + features, neurons) consequent weights, row 0 is the bias
///
/// The three matrices always carry the same column count outside of an
/// explicit [`rebuild`](FuzzyNetwork::rebuild) transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzyNetwork {
    features: usize,
    centers: Array2<f64>,
    widths: Array2<f64>,
    weights: Array2<f64>,
    min_width: f64,
}

impl FuzzyNetwork {
    /// Create a network with the given feature count and neuron count.
    ///
    /// Centers start at zero and widths at `initial_width`; call
    /// [`init_centers_from_samples`](Self::init_centers_from_samples) to
    /// seed centers from data.
    pub fn new(features: usize, neurons: usize, config: &NetworkConfig) -> Self {
        Self {
            features,
            centers: Array2::zeros((features, neurons)),
            widths: Array2::from_elem((features, neurons), config.initial_width),
            weights: Array2::zeros((1 + features, neurons)),
            min_width: config.min_width,
        }
    }

    /// Seed membership centers from randomly drawn training samples
    pub fn init_centers_from_samples(&mut self, x: &Array2<f64>, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for j in 0..self.neurons() {
            let row = rng.gen_range(0..x.nrows());
            for f in 0..self.features {
                self.centers[[f, j]] = x[[row, f]];
            }
        }
    }

    /// Number of input features
    #[inline]
    pub fn features(&self) -> usize {
        self.features
    }

    /// Current number of fuzzy-rule neurons
    #[inline]
    pub fn neurons(&self) -> usize {
        self.centers.ncols()
    }

    /// Read the rule parameters (centers, widths)
    pub fn rule_parameters(&self) -> (Array2<f64>, Array2<f64>) {
        (self.centers.clone(), self.widths.clone())
    }

    /// Read the full parameter triple (centers, widths, consequent weights)
    pub fn parameters(&self) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        (
            self.centers.clone(),
            self.widths.clone(),
            self.weights.clone(),
        )
    }

    /// Overwrite the rule parameters; shapes must match the current size
    pub fn set_rule_parameters(
        &mut self,
        centers: Array2<f64>,
        widths: Array2<f64>,
    ) -> Result<(), NetworkError> {
        self.check_shape("centers", centers.dim(), (self.features, self.neurons()))?;
        self.check_shape("widths", widths.dim(), (self.features, self.neurons()))?;
        self.centers = centers;
        self.widths = widths.mapv(|s| s.max(self.min_width));
        Ok(())
    }

    /// Overwrite the full parameter triple; shapes must match the current size
    pub fn set_parameters(
        &mut self,
        centers: Array2<f64>,
        widths: Array2<f64>,
        weights: Array2<f64>,
    ) -> Result<(), NetworkError> {
        self.check_shape("centers", centers.dim(), (self.features, self.neurons()))?;
        self.check_shape("widths", widths.dim(), (self.features, self.neurons()))?;
        self.check_shape(
            "weights",
            weights.dim(),
            (1 + self.features, self.neurons()),
        )?;
        self.centers = centers;
        self.widths = widths.mapv(|s| s.max(self.min_width));
        self.weights = weights;
        Ok(())
    }

    /// Reconstruct the evaluation graph at a new neuron count.
    ///
    /// All parameters reset to defaults at the new size; the caller is
    /// expected to follow up with [`set_parameters`](Self::set_parameters).
    pub fn rebuild(&mut self, neurons: usize) {
        self.centers = Array2::zeros((self.features, neurons));
        self.widths = Array2::from_elem((self.features, neurons), self.min_width);
        self.weights = Array2::zeros((1 + self.features, neurons));
    }

    /// Fuzzy-layer output: per-sample firing strength of every rule.
    ///
    /// Returns (samples, neurons).
    pub fn firing(&self, x: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(x.ncols(), self.features);
        let samples = x.nrows();
        let neurons = self.neurons();
        let mut phi = Array2::zeros((samples, neurons));

        for n in 0..samples {
            for j in 0..neurons {
                let mut exponent = 0.0;
                for f in 0..self.features {
                    let d = x[[n, f]] - self.centers[[f, j]];
                    let s = self.widths[[f, j]];
                    exponent += (d * d) / (2.0 * s * s);
                }
                phi[[n, j]] = (-exponent).exp();
            }
        }
        phi
    }

    /// Normalized firing strengths: each row of [`firing`](Self::firing)
    /// scaled to sum to one.
    pub fn normalized_firing(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut phi = self.firing(x);
        for mut row in phi.axis_iter_mut(Axis(0)) {
            let sum: f64 = row.sum();
            if sum > f64::MIN_POSITIVE {
                row.mapv_inplace(|v| v / sum);
            } else {
                // all rules fully inactive: fall back to uniform weighting
                let uniform = 1.0 / row.len() as f64;
                row.fill(uniform);
            }
        }
        phi
    }

    /// Full forward pass to the scalar output, one value per sample
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let psi = self.normalized_firing(x);
        let samples = x.nrows();
        let neurons = self.neurons();
        let mut out = Array1::zeros(samples);

        for n in 0..samples {
            let mut y = 0.0;
            for j in 0..neurons {
                let mut local = self.weights[[0, j]];
                for f in 0..self.features {
                    local += self.weights[[1 + f, j]] * x[[n, f]];
                }
                y += psi[[n, j]] * local;
            }
            out[n] = y;
        }
        out
    }

    /// Check parameters for NaN/Inf corruption
    pub fn is_valid(&self) -> bool {
        self.centers.iter().all(|v| v.is_finite())
            && self.widths.iter().all(|v| v.is_finite() && *v > 0.0)
            && self.weights.iter().all(|v| v.is_finite())
    }

    pub(crate) fn min_width(&self) -> f64 {
        self.min_width
    }

    pub(crate) fn centers_mut(&mut self) -> &mut Array2<f64> {
        &mut self.centers
    }

    pub(crate) fn widths_mut(&mut self) -> &mut Array2<f64> {
        &mut self.widths
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    fn check_shape(
        &self,
        name: &str,
        got: (usize, usize),
        want: (usize, usize),
    ) -> Result<(), NetworkError> {
        if got != want {
            return Err(NetworkError::ShapeMismatch {
                name: name.to_string(),
                got,
                want,
            });
        }
        Ok(())
    }
}

/// Errors from parameter accessors
#[derive(Debug)]
pub enum NetworkError {
    /// A parameter write did not match the current graph size
    ShapeMismatch {
        name: String,
        got: (usize, usize),
        want: (usize, usize),
    },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::ShapeMismatch { name, got, want } => write!(
                f,
                "{} shape mismatch: got {:?}, expected {:?}",
                name, got, want
            ),
        }
    }
}

impl std::error::Error for NetworkError {}
