
use bitvec::prelude::*;
use tracing::debug;

use crate::branch::Outcome;
use crate::fixed::FixedInt;
use crate::predictor::config::*;

/// The result of evaluating a [Perceptron] against some history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerceptronOutput {
    /// The (wrapped) weighted sum
    pub y: i32,

    /// Predicted direction: taken when `y >= 0`
    pub outcome: Outcome,
}

/// Perceptron with fixed-width integer weights.
///
/// See the following papers:
///
/// - "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001)
/// - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
///
/// Each history bit selects its weight into the sum when it is set (taken)
/// and contributes nothing when it is clear. The sum and every weight are
/// registers of a fixed width which wrap on overflow (see [crate::fixed]).
#[derive(Clone, Debug)]
pub struct Perceptron {
    cfg: PerceptronConfig,
    weights: Vec<FixedInt>,
    bias: Option<FixedInt>,
}
impl Perceptron {
    pub fn new(cfg: PerceptronConfig) -> Self {
        Self {
            weights: vec![FixedInt::zero(cfg.weight_bits); cfg.history_len],
            bias: cfg.bias.then(|| FixedInt::zero(cfg.weight_bits)),
            cfg,
        }
    }

    /// Create a perceptron with some initial weights (wrapped into range).
    /// Missing weights are zero and extra weights are ignored.
    pub fn from_weights(cfg: PerceptronConfig, weights: &[i32]) -> Self {
        let mut res = Self::new(cfg);
        for (w, init) in res.weights.iter_mut().zip(weights) {
            *w = FixedInt::new(cfg.weight_bits, *init);
        }
        res
    }

    /// Reset the state.
    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(FixedInt::clear);
        if let Some(bias) = self.bias.as_mut() {
            bias.clear();
        }
    }

    /// Return the current weights.
    pub fn weights(&self) -> Vec<i32> {
        self.weights.iter().map(FixedInt::value).collect()
    }

    /// Return the bias weight, if this perceptron has one.
    pub fn bias(&self) -> Option<i32> {
        self.bias.map(|b| b.value())
    }

    /// Given some history, compute the weighted sum.
    /// The predicted outcome is determined by the sign of the sum.
    pub fn predict(&self, history: &BitSlice) -> PerceptronOutput {
        debug_assert_eq!(history.len(), self.weights.len());
        let mut y = FixedInt::new(self.cfg.sum_bits(), self.bias().unwrap_or(0));

        for (w, bit) in self.weights.iter().zip(history.iter().by_vals()) {
            let term = if bit { w.value() } else { 0 };
            let wrapped = match self.cfg.sum_mode {
                SumMode::Accumulate => y.add_wrapping(term),
                SumMode::LastTerm => y.set_wrapping(term),
            };
            if wrapped {
                debug!(y = y.value(), "weighted sum overflow");
            }
        }

        let y = y.value();
        let outcome = if y >= 0 { Outcome::T } else { Outcome::N };
        PerceptronOutput { y, outcome }
    }

    /// Given the correct outcome, adjust the weights.
    /// Returns 'true' if any training occurred.
    pub fn update(&mut self, outcome: Outcome, history: &BitSlice) -> bool {
        let PerceptronOutput { y, outcome: prediction } = self.predict(history);

        // Training occurs after a misprediction, or when the magnitude of the
        // output is at or below the threshold.
        let miss = prediction != outcome;
        let below_threshold = y.abs() <= self.cfg.threshold;
        if !(miss || below_threshold) {
            return false;
        }

        let t = outcome.sign();
        if let Some(bias) = self.bias.as_mut() {
            if bias.add_wrapping(t) {
                debug!(bias = bias.value(), "bias overflow");
            }
        }

        let rule = self.cfg.training_rule;
        for (idx, (w, bit)) in self.weights.iter_mut()
            .zip(history.iter().by_vals())
            .enumerate()
        {
            let adj = match rule {
                TrainingRule::Uniform => t,
                TrainingRule::Correlated => {
                    if Outcome::from(bit) == outcome { 1 } else { -1 }
                },
            };
            if w.add_wrapping(adj) {
                debug!(idx, weight = w.value(), "weight overflow");
            }
        }
        true
    }
}
