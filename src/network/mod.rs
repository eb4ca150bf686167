//! Five-layer fuzzy neural network evaluation engine.
//!
//! Implements the rule-based model the organizer works against:
//! - Fuzzy layer: Gaussian membership per rule neuron
//! - Normalization layer: relative firing strengths
//! - Weighted layer: per-rule linear local models
//! - Output layer: summation to a scalar prediction
//!
//! The organizer never touches these internals; it reads and writes
//! parameters only through the accessors on [`FuzzyNetwork`].

mod model;
mod persist;
mod training;

pub use model::{FuzzyNetwork, NetworkError};
pub use persist::{ModelCheckpoint, PersistError};
pub use training::TrainingSummary;
