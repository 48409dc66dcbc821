//! The perceptron branch predictor.

pub mod config;
pub mod perceptron;
pub mod table;

pub use config::*;
pub use perceptron::*;
pub use table::*;

use tracing::trace;

use crate::branch::Outcome;
use crate::error::ConfigError;
use crate::history::GlobalHistory;

/// A prediction made by a [BranchPredictor].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prediction {
    /// The predicted direction
    pub outcome: Outcome,

    /// The weighted sum ("confidence") behind the prediction
    pub y: i32,

    /// The table entry used to make the prediction
    pub index: usize,
}

/// A table of perceptrons sharing a single global history register.
///
/// Predictions never change state. Updates must be applied in program order:
/// each update trains against the history that existed before the outcome
/// is recorded.
#[derive(Clone, Debug)]
pub struct BranchPredictor {
    cfg: PerceptronConfig,
    table: PredictorTable,
    ghr: GlobalHistory,
}
impl BranchPredictor {
    pub fn new(cfg: PerceptronConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            table: PredictorTable::new(cfg),
            ghr: GlobalHistory::new(cfg.history_len),
            cfg,
        })
    }

    pub fn config(&self) -> &PerceptronConfig { &self.cfg }
    pub fn history(&self) -> &GlobalHistory { &self.ghr }
    pub fn table(&self) -> &PredictorTable { &self.table }
    pub fn num_perceptrons(&self) -> usize { self.table.size() }

    /// Table entry used for the branch at `pc`, after latching the
    /// configured number of address bits.
    pub fn index(&self, pc: u32) -> usize {
        self.table.index(pc & self.cfg.address_mask())
    }

    /// Predict the direction of the branch at `pc`.
    pub fn predict(&self, pc: u32) -> Prediction {
        let index = self.index(pc);
        let out = self.table.get(index).predict(self.ghr.data());
        Prediction { outcome: out.outcome, y: out.y, index }
    }

    /// Train with the resolved outcome of the branch at `pc`, then record
    /// the outcome in global history. Returns 'true' if the entry trained.
    pub fn update(&mut self, pc: u32, outcome: Outcome) -> bool {
        let index = self.index(pc);
        let trained = self.table.get_mut(index).update(outcome, self.ghr.data());
        trace!(pc, index, ?outcome, trained, ghr = %self.ghr, "update");
        self.ghr.push(outcome);
        trained
    }

    /// Current weights of a table entry.
    pub fn weights(&self, index: usize) -> Vec<i32> {
        self.table.get(index).weights()
    }

    /// Current bias weight of a table entry, if the entries keep one.
    pub fn bias(&self, index: usize) -> Option<i32> {
        self.table.get(index).bias()
    }

    /// Return to the initial state: zero weights and all-not-taken history.
    pub fn reset(&mut self) {
        self.table.reset();
        self.ghr.clear();
    }
}
