//! Saving and loading trained models.

use super::model::FuzzyNetwork;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A trained model plus the configuration that produced it
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelCheckpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Configuration used during organization
    pub config: Config,
    /// The trained network
    pub network: FuzzyNetwork,
    /// Neurons at save time
    pub neurons: usize,
}

impl ModelCheckpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    /// Snapshot a trained network
    pub fn new(config: Config, network: FuzzyNetwork) -> Self {
        let neurons = network.neurons();
        Self {
            version: Self::VERSION,
            config,
            network,
            neurons,
        }
    }

    /// Save checkpoint to a binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }

    /// Load checkpoint from a binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        let checkpoint: Self = bincode::deserialize(&buffer)?;
        if checkpoint.version != Self::VERSION {
            return Err(PersistError::Version {
                got: checkpoint.version,
                want: Self::VERSION,
            });
        }
        Ok(checkpoint)
    }
}

/// Errors from checkpoint IO
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Encoding(bincode::Error),
    Version { got: u32, want: u32 },
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "IO error: {}", e),
            PersistError::Encoding(e) => write!(f, "encoding error: {}", e),
            PersistError::Version { got, want } => {
                write!(f, "checkpoint version {} not supported (expected {})", got, want)
            }
        }
    }
}

impl std::error::Error for PersistError {}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<bincode::Error> for PersistError {
    fn from(e: bincode::Error) -> Self {
        PersistError::Encoding(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use ndarray::array;

    #[test]
    fn test_checkpoint_roundtrip() {
        let mut net = FuzzyNetwork::new(1, 2, &NetworkConfig::default());
        net.set_parameters(
            array![[0.25, 0.75]],
            array![[1.5, 2.5]],
            array![[0.1, 0.2], [0.3, 0.4]],
        )
        .unwrap();

        let checkpoint = ModelCheckpoint::new(Config::default(), net.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        checkpoint.save(&path).unwrap();

        let loaded = ModelCheckpoint::load(&path).unwrap();
        assert_eq!(loaded.version, ModelCheckpoint::VERSION);
        assert_eq!(loaded.neurons, 2);
        assert_eq!(loaded.network.parameters().0, net.parameters().0);
        assert_eq!(loaded.network.parameters().2, net.parameters().2);
    }

    #[test]
    fn test_missing_file_errors() {
        let result = ModelCheckpoint::load("/nonexistent/model.bin");
        assert!(matches!(result, Err(PersistError::Io(_))));
    }
}
