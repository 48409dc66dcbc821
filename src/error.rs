//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// A predictor configuration that cannot be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("weight width must be 2, 4 or 8 bits (got {0})")]
    InvalidWeightWidth(u32),

    #[error("history length must be non-zero")]
    EmptyHistory,

    #[error("weighted-sum width must be between 2 and 31 bits (got {0})")]
    InvalidSumWidth(u32),

    #[error("training threshold must be non-negative (got {0})")]
    NegativeThreshold(i32),

    #[error("latched address width must be between 1 and 32 bits (got {0})")]
    InvalidAddressWidth(u32),

    #[error("storage budget of {budget} bits cannot hold one {per_entry}-bit perceptron")]
    StorageTooSmall { budget: usize, per_entry: usize },
}

/// Errors that abort an evaluation run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot read trace '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
