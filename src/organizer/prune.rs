//! Neuron pruning: greedy removal of rules whose absence keeps error
//! within tolerance.

use super::OrganizeError;
use crate::config::OrganizerConfig;
use crate::dataset::Dataset;
use crate::metrics;
use crate::network::FuzzyNetwork;
use log::{debug, info};
use ndarray::{Array1, Array2};

/// Outcome of one pruning pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Fewer than two neurons: pruning is a defined no-op
    SkippedSingleNeuron,
    /// No candidate survived the tolerance check
    NothingPruned,
    /// These neuron indices were structurally deleted
    Pruned(Vec<usize>),
}

/// Remove zero or more neurons whose simulated removal keeps the mean
/// absolute error within tolerance.
///
/// `y_pred` is the current thresholded prediction vector for the test
/// split. Candidate neurons are tried in ascending order of the error
/// increase their removal causes, the single most damaging neuron is
/// never a candidate, and the search stops at the first candidate that
/// pushes error past tolerance. Accepted deletions are applied to all
/// three parameter matrices in one transaction; no retraining follows.
pub fn prune_neurons(
    network: &mut FuzzyNetwork,
    data: &Dataset,
    y_pred: &Array1<f64>,
    config: &OrganizerConfig,
) -> Result<PruneOutcome, OrganizeError> {
    let neurons = network.neurons();

    // a model must retain at least one rule
    if neurons <= 1 {
        debug!("skipping pruning: only one neuron exists");
        return Ok(PruneOutcome::SkippedSingleNeuron);
    }

    debug!("pruning pass over {} neurons", neurons);

    let baseline_error = metrics::mae(data.y_test(), y_pred);
    let (c0, s0, a0) = network.parameters();

    // per-neuron error change when that neuron's consequent column is
    // zeroed, baseline restored before each trial
    let mut delta = vec![0.0f64; neurons];
    for neuron in 0..neurons {
        let error = trial_error(network, data, &c0, &s0, &a0, &[neuron], config)?;
        delta[neuron] = error - baseline_error;
    }

    // relative tolerance with an absolute floor, so pruning is not
    // overly aggressive when baseline error is already near zero
    let tolerance = (config.prune_tol * baseline_error).max(config.k_mae);

    // ascending by damage; the most damaging neuron is never tried
    let mut order: Vec<usize> = (0..neurons).collect();
    order.sort_by(|&i, &j| delta[i].total_cmp(&delta[j]));
    order.pop();

    let mut deleted: Vec<usize> = Vec::new();
    for &candidate in &order {
        let mut trial: Vec<usize> = deleted.clone();
        trial.push(candidate);
        let error = trial_error(network, data, &c0, &s0, &a0, &trial, config)?;
        if error < tolerance {
            deleted.push(candidate);
        } else {
            // greedy: the first failure ends the search
            break;
        }
    }

    if deleted.is_empty() {
        debug!("no neurons detected for pruning");
        network.set_parameters(c0, s0, a0)?;
        return Ok(PruneOutcome::NothingPruned);
    }

    info!("pruning neurons {:?}", deleted);

    // delete the accepted columns from all three matrices at once,
    // preserving relative order of survivors
    let survivors: Vec<usize> = (0..neurons).filter(|j| !deleted.contains(j)).collect();
    let features = network.features();
    let mut c = Array2::zeros((features, survivors.len()));
    let mut s = Array2::zeros((features, survivors.len()));
    let mut a = Array2::zeros((1 + features, survivors.len()));
    for (col, &j) in survivors.iter().enumerate() {
        for f in 0..features {
            c[[f, col]] = c0[[f, j]];
            s[[f, col]] = s0[[f, j]];
        }
        for k in 0..=features {
            a[[k, col]] = a0[[k, j]];
        }
    }

    network.rebuild(survivors.len());
    network.set_parameters(c, s, a)?;

    deleted.sort_unstable();
    Ok(PruneOutcome::Pruned(deleted))
}

/// MAE of thresholded test predictions with the given neurons' consequent
/// columns zeroed, starting from the baseline parameters.
fn trial_error(
    network: &mut FuzzyNetwork,
    data: &Dataset,
    c0: &Array2<f64>,
    s0: &Array2<f64>,
    a0: &Array2<f64>,
    zeroed: &[usize],
    config: &OrganizerConfig,
) -> Result<f64, OrganizeError> {
    let mut a = a0.clone();
    for &neuron in zeroed {
        for k in 0..a.nrows() {
            a[[k, neuron]] = 0.0;
        }
    }
    network.set_parameters(c0.clone(), s0.clone(), a)?;

    let raw = network.predict(data.x_test());
    let y_pred = metrics::threshold(&raw, config.eval_thresh);
    Ok(metrics::mae(data.y_test(), &y_pred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use ndarray::array;

    fn config() -> OrganizerConfig {
        OrganizerConfig::default()
    }

    /// Two well-separated rules; rule 0 pushes its cluster to class 1,
    /// rule 1 contributes nothing.
    fn redundant_net() -> FuzzyNetwork {
        let mut net = FuzzyNetwork::new(1, 2, &NetworkConfig::default());
        net.set_parameters(
            array![[0.0, 10.0]],
            array![[1.0, 1.0]],
            array![[1.0, 0.0], [0.0, 0.0]],
        )
        .unwrap();
        net
    }

    fn cluster_data() -> Dataset {
        let x_train = array![[0.0], [0.5], [10.0], [10.5]];
        let y_train = array![1.0, 1.0, 0.0, 0.0];
        let x_test = array![[0.0], [0.3], [10.0], [10.2]];
        let y_test = array![1.0, 1.0, 0.0, 0.0];
        Dataset::new(x_train, y_train, x_test, y_test).unwrap()
    }

    fn current_pred(net: &FuzzyNetwork, data: &Dataset, config: &OrganizerConfig) -> Array1<f64> {
        metrics::threshold(&net.predict(data.x_test()), config.eval_thresh)
    }

    #[test]
    fn test_single_neuron_no_op() {
        let mut net = FuzzyNetwork::new(1, 1, &NetworkConfig::default());
        net.set_parameters(array![[0.0]], array![[1.0]], array![[1.0], [0.0]])
            .unwrap();
        let data = cluster_data();
        let config = config();
        let (c_before, s_before, a_before) = net.parameters();

        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        assert_eq!(outcome, PruneOutcome::SkippedSingleNeuron);
        let (c, s, a) = net.parameters();
        assert_eq!(c, c_before);
        assert_eq!(s, s_before);
        assert_eq!(a, a_before);
    }

    #[test]
    fn test_redundant_neuron_pruned() {
        let mut net = redundant_net();
        let data = cluster_data();
        let config = config();

        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        // neuron 1 contributes nothing: zeroing it leaves error at the
        // baseline, well inside the k_mae floor
        assert_eq!(outcome, PruneOutcome::Pruned(vec![1]));
        assert_eq!(net.neurons(), 1);

        // the survivor is former neuron 0
        let (c, _, a) = net.parameters();
        assert_eq!(c[[0, 0]], 0.0);
        assert_eq!(a[[0, 0]], 1.0);
    }

    /// Two well-separated rules that both carry real signal: each
    /// cluster is class 1 and depends on its own rule's bias.
    fn both_important() -> (FuzzyNetwork, Dataset) {
        let mut net = FuzzyNetwork::new(1, 2, &NetworkConfig::default());
        net.set_parameters(
            array![[0.0, 10.0]],
            array![[1.0, 1.0]],
            array![[1.0, 1.0], [0.0, 0.0]],
        )
        .unwrap();
        let x = array![[0.0], [0.3], [10.0], [10.2]];
        let y = array![1.0, 1.0, 1.0, 1.0];
        let data = Dataset::new(x.clone(), y.clone(), x, y).unwrap();
        (net, data)
    }

    #[test]
    fn test_important_neuron_survives() {
        let (mut net, data) = both_important();
        // tight absolute floor so any error increase blocks deletion
        let mut config = config();
        config.k_mae = 1e-6;
        config.prune_tol = 0.5;

        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        // zeroing either rule's consequent column drops its cluster to
        // class 0: nothing prunable
        assert_eq!(outcome, PruneOutcome::NothingPruned);
        assert_eq!(net.neurons(), 2);
    }

    #[test]
    fn test_baseline_restored_when_nothing_pruned() {
        let (mut net, data) = both_important();
        let mut config = config();
        config.k_mae = 1e-6;
        config.prune_tol = 0.5;

        let (c_before, s_before, a_before) = net.parameters();
        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        assert_eq!(outcome, PruneOutcome::NothingPruned);
        let (c, s, a) = net.parameters();
        assert_eq!(c, c_before);
        assert_eq!(s, s_before);
        assert_eq!(a, a_before);
    }

    #[test]
    fn test_matrices_stay_in_lockstep_after_prune() {
        let mut net = FuzzyNetwork::new(2, 4, &NetworkConfig::default());
        let mut a = Array2::zeros((3, 4));
        a[[0, 0]] = 1.0;
        net.set_parameters(
            array![[0.0, 3.0, 6.0, 9.0], [0.0, 3.0, 6.0, 9.0]],
            Array2::from_elem((2, 4), 2.0),
            a,
        )
        .unwrap();

        let x_train = array![[0.0, 0.0], [3.0, 3.0], [6.0, 6.0], [9.0, 9.0]];
        let y_train = array![1.0, 0.0, 0.0, 0.0];
        let x_test = x_train.clone();
        let y_test = y_train.clone();
        let data = Dataset::new(x_train, y_train, x_test, y_test).unwrap();
        let config = config();

        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        let (c, s, a) = net.parameters();
        assert_eq!(c.ncols(), s.ncols());
        assert_eq!(s.ncols(), a.ncols());
        if let PruneOutcome::Pruned(deleted) = outcome {
            assert_eq!(c.ncols(), 4 - deleted.len());
        }
    }

    #[test]
    fn test_survivor_order_preserved() {
        // neurons 1 and 3 are dead weight; survivors 0 and 2 must keep
        // their relative order
        let mut net = FuzzyNetwork::new(1, 4, &NetworkConfig::default());
        let mut a = Array2::zeros((2, 4));
        a[[0, 0]] = 1.0;
        a[[0, 2]] = 1.0;
        net.set_parameters(
            array![[0.0, 5.0, 10.0, 15.0]],
            Array2::from_elem((1, 4), 1.0),
            a,
        )
        .unwrap();

        let x_train = array![[0.0], [10.0]];
        let y_train = array![1.0, 1.0];
        let data = Dataset::new(
            x_train.clone(),
            y_train.clone(),
            x_train,
            y_train,
        )
        .unwrap();
        let config = config();

        let pred = current_pred(&net, &data, &config);
        let outcome = prune_neurons(&mut net, &data, &pred, &config).unwrap();

        if let PruneOutcome::Pruned(deleted) = outcome {
            let (c, _, a) = net.parameters();
            let survivors: Vec<usize> = (0..4).filter(|j| !deleted.contains(j)).collect();
            for (col, &j) in survivors.iter().enumerate() {
                assert_eq!(c[[0, col]], (j as f64) * 5.0);
            }
            assert_eq!(a.ncols(), survivors.len());
        }
    }
}
