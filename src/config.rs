//! Configuration system for the self-organizing fuzzy network.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub organizer: OrganizerConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// Fuzzy network structure configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of fuzzy-rule neurons at the start
    pub initial_neurons: usize,
    /// Initial width for every membership function
    pub initial_width: f64,
    /// Lower bound on membership widths (keeps the Gaussian well-defined)
    pub min_width: f64,
    /// Initialize centers from randomly drawn training samples
    pub centers_from_samples: bool,
}

/// Self-organization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Factor applied to a width when widening centers (> 1)
    pub ksig: f64,
    /// Maximum widening iterations before bailing out
    pub max_widens: usize,
    /// Error-criterion threshold: organization stops adding neurons
    /// once test error is at or below this value
    pub err_delta: f64,
    /// If-part threshold: every training sample must fire some rule
    /// at least this strongly
    pub ifpart_thresh: f64,
    /// Relative pruning tolerance (0 < prune_tol < 1)
    pub prune_tol: f64,
    /// Absolute floor on the pruning tolerance
    pub k_mae: f64,
    /// Cutoff for thresholding raw predictions into classes
    pub eval_thresh: f64,
    /// Multiplier of per-feature mean used as the distance threshold
    /// when deriving new-neuron weights
    pub dist_thresh: f64,
    /// Maximum number of neurons before organization terminates
    pub max_neurons: usize,
    /// Hard bound on organize iterations; pruning can shrink the model
    /// back under the neuron cap, so the cap alone does not guarantee
    /// termination
    pub max_iterations: usize,
}

/// Gradient training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Gradient descent learning rate
    pub learning_rate: f64,
    /// Maximum training epochs per fit
    pub max_epochs: usize,
    /// Convergence tolerance on the change in loss between epochs
    pub tolerance: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Organization iterations between evaluation summaries
    pub eval_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            organizer: OrganizerConfig::default(),
            training: TrainingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initial_neurons: 1,
            initial_width: 4.0,
            min_width: 1e-3,
            centers_from_samples: true,
        }
    }
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            ksig: 1.12,
            max_widens: 250,
            err_delta: 0.12,
            ifpart_thresh: 0.1354,
            prune_tol: 0.85,
            k_mae: 0.1,
            eval_thresh: 0.5,
            dist_thresh: 1.0,
            max_neurons: 100,
            max_iterations: 50,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            max_epochs: 500,
            tolerance: 1e-6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            eval_interval: 1,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.network.initial_neurons == 0 {
            return Err("network.initial_neurons must be at least 1".to_string());
        }
        if self.network.initial_width <= 0.0 {
            return Err("network.initial_width must be positive".to_string());
        }
        if self.network.min_width <= 0.0 {
            return Err("network.min_width must be positive".to_string());
        }
        if self.organizer.ksig <= 1.0 {
            return Err("organizer.ksig must be greater than 1".to_string());
        }
        if self.organizer.max_widens == 0 {
            return Err("organizer.max_widens must be at least 1".to_string());
        }
        if self.organizer.prune_tol <= 0.0 || self.organizer.prune_tol >= 1.0 {
            return Err("organizer.prune_tol must be in (0, 1)".to_string());
        }
        if self.organizer.ifpart_thresh <= 0.0 || self.organizer.ifpart_thresh > 1.0 {
            return Err("organizer.ifpart_thresh must be in (0, 1]".to_string());
        }
        if !self.organizer.err_delta.is_finite() || self.organizer.err_delta < 0.0 {
            return Err("organizer.err_delta must be non-negative".to_string());
        }
        if !self.organizer.k_mae.is_finite() || self.organizer.k_mae < 0.0 {
            return Err("organizer.k_mae must be non-negative".to_string());
        }
        if !self.organizer.eval_thresh.is_finite() {
            return Err("organizer.eval_thresh must be finite".to_string());
        }
        if !self.organizer.dist_thresh.is_finite() || self.organizer.dist_thresh <= 0.0 {
            return Err("organizer.dist_thresh must be positive".to_string());
        }
        if self.organizer.max_iterations == 0 {
            return Err("organizer.max_iterations must be at least 1".to_string());
        }
        if self.organizer.max_neurons < self.network.initial_neurons {
            return Err("organizer.max_neurons must be >= network.initial_neurons".to_string());
        }
        if self.training.learning_rate <= 0.0 {
            return Err("training.learning_rate must be positive".to_string());
        }
        if self.training.max_epochs == 0 {
            return Err("training.max_epochs must be at least 1".to_string());
        }
        if self.logging.eval_interval == 0 {
            return Err("logging.eval_interval must be at least 1".to_string());
        }
        Ok(())
    }
}
