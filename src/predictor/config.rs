//! Configuration for building a [`BranchPredictor`].

use crate::error::ConfigError;
use crate::fixed;
use crate::predictor::*;

/// How per-position terms are combined into the weighted sum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SumMode {
    /// A running sum over every history position.
    Accumulate,

    /// Each term overwrites the sum, so only the last history position
    /// contributes. Models a datapath that reassigns the sum register
    /// instead of accumulating into it.
    LastTerm,
}

/// How the weights move when a perceptron trains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TrainingRule {
    /// Every weight moves toward the outcome (+1 taken, -1 not taken).
    Uniform,

    /// A weight moves +1 when its history bit agrees with the outcome and
    /// -1 otherwise (the classic perceptron rule).
    Correlated,
}

/// Parameters of a perceptron predictor.
///
/// The derived quantities (table size, sum width, storage per entry) are
/// computed from these once and never change for the life of a predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerceptronConfig {
    /// Number of global history bits (and weights per perceptron)
    pub history_len: usize,

    /// Width of each weight in bits
    pub weight_bits: u32,

    /// Width of the weighted sum in bits. Derived from the history length
    /// and weight width when unset.
    pub sum_bits: Option<u32>,

    /// Magnitude of the weighted sum at or below which a correct prediction
    /// still trains
    pub threshold: i32,

    /// Total storage budget for the table in bits
    pub storage_bits: usize,

    /// Keep a bias weight in each perceptron
    pub bias: bool,

    pub sum_mode: SumMode,
    pub training_rule: TrainingRule,

    /// Number of low program counter bits latched by the predictor
    pub address_bits: u32,
}

impl PerceptronConfig {
    /// Supported weight widths.
    pub const WEIGHT_WIDTHS: [u32; 3] = [2, 4, 8];

    /// Four history bits and 4-bit weights in a 128-bit table.
    pub const REFERENCE: Self = Self {
        history_len: 4,
        weight_bits: 4,
        sum_bits: None,
        threshold: 15,
        storage_bits: 128,
        bias: false,
        sum_mode: SumMode::Accumulate,
        training_rule: TrainingRule::Uniform,
        address_bits: 32,
    };

    /// Width of the weighted sum: explicit, or `ceil(log2(H * 2^(W-1)))`
    /// with a floor of two bits.
    pub fn sum_bits(&self) -> u32 {
        self.sum_bits.unwrap_or_else(|| {
            let log_h = match self.history_len {
                0 | 1 => 0,
                h => (h - 1).ilog2() + 1,
            };
            self.weight_bits.saturating_sub(1).saturating_add(log_h).max(2)
        })
    }

    /// Largest representable weight.
    pub fn weight_max(&self) -> i32 { fixed::max_value(self.weight_bits) }

    /// Largest representable weighted sum.
    pub fn sum_max(&self) -> i32 { fixed::max_value(self.sum_bits()) }

    /// Number of weights stored per perceptron (including the bias).
    pub fn weights_per_perceptron(&self) -> usize {
        self.history_len.saturating_add(usize::from(self.bias))
    }

    /// Number of storage bits used by a single perceptron.
    pub fn storage_per_perceptron(&self) -> usize {
        self.weights_per_perceptron().saturating_mul(self.weight_bits as usize)
    }

    /// Number of perceptrons that fit in the storage budget.
    pub fn num_perceptrons(&self) -> usize {
        match self.storage_per_perceptron() {
            0 => 0,
            per_entry => self.storage_bits / per_entry,
        }
    }

    /// Mask selecting the latched bits of a program counter.
    pub fn address_mask(&self) -> u32 {
        if self.address_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.address_bits) - 1
        }
    }

    /// Check that these parameters describe a buildable predictor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Self::WEIGHT_WIDTHS.contains(&self.weight_bits) {
            return Err(ConfigError::InvalidWeightWidth(self.weight_bits));
        }
        if self.history_len == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        let sum_bits = self.sum_bits();
        if !(2..=31).contains(&sum_bits) {
            return Err(ConfigError::InvalidSumWidth(sum_bits));
        }
        if self.threshold < 0 {
            return Err(ConfigError::NegativeThreshold(self.threshold));
        }
        if !(1..=32).contains(&self.address_bits) {
            return Err(ConfigError::InvalidAddressWidth(self.address_bits));
        }
        if self.num_perceptrons() == 0 {
            return Err(ConfigError::StorageTooSmall {
                budget: self.storage_bits,
                per_entry: self.storage_per_perceptron(),
            });
        }
        Ok(())
    }

    /// Use this configuration to create a new [`BranchPredictor`].
    pub fn build(self) -> Result<BranchPredictor, ConfigError> {
        BranchPredictor::new(self)
    }
}

impl Default for PerceptronConfig {
    fn default() -> Self { Self::REFERENCE }
}
