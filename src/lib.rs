//! # SOFNN
//!
//! Self-organizing fuzzy neural network: a supervised model whose
//! topology grows and shrinks during training based on error and
//! coverage criteria.
//!
//! ## Features
//!
//! - **Self-organizing**: rule neurons are widened, added, and pruned
//!   automatically until error and coverage criteria hold
//! - **Deterministic**: seeded random number generation, lowest-index
//!   tie-breaking throughout
//! - **Configurable**: YAML configuration files
//! - **Persistent**: trained models save to binary checkpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sofnn::{Config, Dataset, FuzzyNetwork, SelfOrganizer};
//!
//! let config = Config::default();
//! let data = Dataset::from_csv("data.csv", 0.25, 42).unwrap();
//!
//! let mut network = FuzzyNetwork::new(
//!     data.features(),
//!     config.network.initial_neurons,
//!     &config.network,
//! );
//! network.init_centers_from_samples(data.x_train(), 42);
//!
//! let report = SelfOrganizer::new(&mut network, &data, &config)
//!     .self_organize()
//!     .unwrap();
//!
//! println!("terminated: {:?}", report.termination);
//! println!("final: {}", report.final_eval.summary());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use sofnn::Config;
//!
//! let mut config = Config::default();
//! config.organizer.max_neurons = 20;
//! config.organizer.err_delta = 0.1;
//! ```

pub mod config;
pub mod dataset;
pub mod metrics;
pub mod network;
pub mod organizer;

// Re-export main types
pub use config::Config;
pub use dataset::Dataset;
pub use network::{FuzzyNetwork, ModelCheckpoint};
pub use organizer::{OrganizeReport, SelfOrganizer, Termination};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
