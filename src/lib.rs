//! A model of a fixed-width perceptron branch predictor, evaluated against
//! instruction traces captured from a RISC-V core.

pub mod branch;
pub mod error;
pub mod eval;
pub mod fixed;
pub mod history;
pub mod predictor;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use error::{ConfigError, Error};
pub use eval::*;
pub use history::*;
pub use predictor::*;
pub use trace::*;
