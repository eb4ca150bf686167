//! Organization criteria: the two tests that decide when the topology
//! is good enough.
//!
//! Both are side-effect-free reads against current model state and are
//! recomputed on every call; nothing here is cached across a parameter
//! mutation.

use crate::config::OrganizerConfig;
use crate::dataset::Dataset;
use crate::metrics;
use crate::network::FuzzyNetwork;

/// Error criterion: true when aggregate error on the test split is at
/// or below the configured delta.
///
/// Error is the mean absolute error between thresholded predictions and
/// ground truth.
pub fn error_criterion(network: &FuzzyNetwork, data: &Dataset, config: &OrganizerConfig) -> bool {
    let raw = network.predict(data.x_test());
    let y_pred = metrics::threshold(&raw, config.eval_thresh);
    metrics::mae(data.y_test(), &y_pred) <= config.err_delta
}

/// If-part criterion: true when every training sample fires at least
/// one rule at or above the if-part threshold.
///
/// A single inadequately-covered sample fails the whole criterion;
/// firing exactly at the threshold passes.
pub fn if_part_criterion(
    network: &FuzzyNetwork,
    data: &Dataset,
    config: &OrganizerConfig,
) -> bool {
    let phi = network.firing(data.x_train());
    phi.rows().into_iter().all(|row| {
        row.iter()
            .any(|&firing| firing >= config.ifpart_thresh)
    })
}
