//! Neuron addition: grow the model by one rule initialized from the
//! minimum-distance geometry between training samples and existing
//! rule centers.

use super::OrganizeError;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::network::{FuzzyNetwork, TrainingSummary};
use log::{debug, info};
use ndarray::{Array1, Array2};

/// Tolerance for the post-rebuild parameter readback check
const READBACK_TOL: f64 = 1e-3;

/// Append one neuron derived from data geometry, then retrain to
/// convergence.
///
/// The structural update is verified by reading the parameters back
/// after the rebuild; a mismatch indicates a resize bug and aborts the
/// operation as a fatal error.
pub fn add_neuron(
    network: &mut FuzzyNetwork,
    data: &Dataset,
    config: &Config,
) -> Result<TrainingSummary, OrganizeError> {
    debug!("adding neuron (current count: {})", network.neurons());

    let (c, s, a) = network.parameters();
    let neurons = network.neurons();
    let features = network.features();

    let (ck, sk) = new_neuron_weights(network, data, config.organizer.dist_thresh);

    // append the derived columns; the consequent column starts at zero
    let mut c_new = Array2::zeros((features, neurons + 1));
    let mut s_new = Array2::zeros((features, neurons + 1));
    let mut a_new = Array2::zeros((1 + features, neurons + 1));
    for f in 0..features {
        for j in 0..neurons {
            c_new[[f, j]] = c[[f, j]];
            s_new[[f, j]] = s[[f, j]];
        }
        c_new[[f, neurons]] = ck[f];
        s_new[[f, neurons]] = sk[f];
    }
    for k in 0..=features {
        for j in 0..neurons {
            a_new[[k, j]] = a[[k, j]];
        }
    }

    network.rebuild(neurons + 1);
    network.set_parameters(c_new.clone(), s_new.clone(), a_new.clone())?;

    // guard against silent truncation or reshaping during the rebuild
    let (c_read, s_read, a_read) = network.parameters();
    if !allclose(&c_new, &c_read) || !allclose(&s_new, &s_read) || !allclose(&a_new, &a_read) {
        return Err(OrganizeError::StructuralMismatch {
            neurons: neurons + 1,
        });
    }

    info!("neuron added ({} -> {})", neurons, neurons + 1);

    // the new rule starts untrained; refit the whole model
    let summary = network.train_to_convergence(data.x_train(), data.y_train(), &config.training);
    debug!(
        "retrained after add: epochs={} loss={:.6} converged={}",
        summary.epochs, summary.final_loss, summary.converged
    );
    Ok(summary)
}

/// Derive center and width vectors for the next neuron.
///
/// Per feature: if the closest existing neuron (by mean absolute
/// distance over training samples) lies within a threshold of the
/// feature mean, reuse its center and width; otherwise fall back to the
/// data centroid for the center and to the raw minimum distance for the
/// width, so the new rule just covers the gap.
pub fn new_neuron_weights(
    network: &FuzzyNetwork,
    data: &Dataset,
    dist_thresh: f64,
) -> (Array1<f64>, Array1<f64>) {
    let (c, s) = network.rule_parameters();
    let features = network.features();

    let min_dist = min_dist_matrix(network, data);

    // closest neuron per feature, lowest index on ties
    let mut dist_vec = Array1::zeros(features);
    let mut nearest = vec![0usize; features];
    for f in 0..features {
        let mut best = 0;
        for j in 0..min_dist.ncols() {
            if min_dist[[f, j]] < min_dist[[f, best]] {
                best = j;
            }
        }
        nearest[f] = best;
        dist_vec[f] = min_dist[[f, best]];
    }

    let means = data.feature_means();

    let mut ck = Array1::zeros(features);
    let mut sk = Array1::zeros(features);
    for f in 0..features {
        let kd = means[f] * dist_thresh;
        if dist_vec[f] <= kd {
            ck[f] = c[[f, nearest[f]]];
            sk[f] = s[[f, nearest[f]]];
        } else {
            ck[f] = means[f];
            sk[f] = dist_vec[f];
        }
    }
    (ck, sk)
}

/// Mean absolute distance between samples and rule centers.
///
/// Entry (f, j) is the mean over training samples of
/// |x[n, f] - c[f, j]|; shape (features, neurons).
pub fn min_dist_matrix(network: &FuzzyNetwork, data: &Dataset) -> Array2<f64> {
    let (c, _) = network.rule_parameters();
    let x = data.x_train();
    let samples = x.nrows();

    let mut dist = Array2::zeros((network.features(), network.neurons()));
    for f in 0..network.features() {
        for j in 0..network.neurons() {
            let mut total = 0.0;
            for n in 0..samples {
                total += (x[[n, f]] - c[[f, j]]).abs();
            }
            dist[[f, j]] = total / samples as f64;
        }
    }
    dist
}

fn allclose(a: &Array2<f64>, b: &Array2<f64>) -> bool {
    a.dim() == b.dim()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= READBACK_TOL)
}
