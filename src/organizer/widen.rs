//! Center widening: grow rule receptive fields until every training
//! sample is adequately covered.

use super::criteria::if_part_criterion;
use crate::config::OrganizerConfig;
use crate::dataset::Dataset;
use crate::network::{FuzzyNetwork, NetworkError};
use log::{debug, info, warn};

/// Result of a widening pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidenResult {
    /// Whether the if-part criterion was satisfied before the iteration
    /// bound was hit
    pub succeeded: bool,
    /// Widening iterations performed; always <= max_widens
    pub iterations: usize,
}

/// Iteratively widen the most under-sized membership width until the
/// if-part criterion passes or the iteration bound is hit.
///
/// Each iteration picks the neuron that is the strongest-firing rule for
/// the largest number of training samples, then multiplies its smallest
/// width by the configured factor. Ties resolve to the lowest index so
/// results are reproducible.
///
/// Hitting the bound is a recoverable status, not an error: the caller
/// falls back to adding a neuron.
pub fn widen_centers(
    network: &mut FuzzyNetwork,
    data: &Dataset,
    config: &OrganizerConfig,
) -> Result<WidenResult, NetworkError> {
    debug!("widening centers (ksig={})", config.ksig);

    let mut iterations = 0;
    while !if_part_criterion(network, data, config) {
        if iterations >= config.max_widens {
            warn!(
                "widening bailed out after {} iterations (max_widens reached)",
                iterations
            );
            return Ok(WidenResult {
                succeeded: false,
                iterations,
            });
        }
        iterations += 1;

        // neuron that wins the arg-max firing for the most samples
        let firing = network.firing(data.x_train());
        let mut wins = vec![0usize; network.neurons()];
        for row in firing.rows() {
            let mut best = 0;
            for (j, &value) in row.iter().enumerate() {
                if value > row[best] {
                    best = j;
                }
            }
            wins[best] += 1;
        }
        let mut target = 0;
        for (j, &count) in wins.iter().enumerate() {
            if count > wins[target] {
                target = j;
            }
        }

        // its most under-sized dimension is the likeliest cause of
        // poor coverage
        let (centers, mut widths) = network.rule_parameters();
        let mut dim = 0;
        for f in 0..widths.nrows() {
            if widths[[f, target]] < widths[[dim, target]] {
                dim = f;
            }
        }

        widths[[dim, target]] *= config.ksig;
        network.set_rule_parameters(centers, widths)?;
    }

    info!("centers widened after {} iterations", iterations);
    Ok(WidenResult {
        succeeded: true,
        iterations,
    })
}
