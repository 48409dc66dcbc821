//! Evaluating a [BranchPredictor] against a trace.

use itertools::Itertools;

use crate::branch::*;
use crate::predictor::*;
use crate::stats::BranchStats;

/// Everything known about one conditional branch after it was predicted and
/// the predictor was trained with its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchEvent {
    /// The committed instruction
    pub record: TraceRecord,

    /// The outcome inferred from the next committed instruction
    pub outcome: Outcome,

    /// The prediction made before training
    pub prediction: Prediction,

    /// Whether the table entry trained on this outcome
    pub trained: bool,

    /// Weights of the table entry after training
    pub weights: Vec<i32>,

    /// Bias weight of the table entry after training
    pub bias: Option<i32>,

    /// Byte offset of the table entry in flat storage
    pub offset: usize,
}
impl BranchEvent {
    pub fn hit(&self) -> bool { self.prediction.outcome == self.outcome }
}

/// Run a predictor over a trace. See [evaluate_with].
pub fn evaluate(records: &[TraceRecord], bp: &mut BranchPredictor) -> BranchStats {
    evaluate_with(records, bp, |_| {})
}

/// Run a predictor over a trace, handing every conditional branch to
/// `observe` after the predictor has been updated.
///
/// Records must be in commit order. The outcome of a branch is inferred from
/// the record after it, so the final record is never evaluated.
pub fn evaluate_with<F>(records: &[TraceRecord], bp: &mut BranchPredictor,
    mut observe: F) -> BranchStats
    where F: FnMut(&BranchEvent)
{
    let mut stat = BranchStats::new();

    for (cur, next) in records.iter().tuple_windows() {
        if !cur.is_conditional() {
            continue;
        }

        let prediction = bp.predict(cur.pc);
        let outcome = cur.outcome_given(next);
        let trained = bp.update(cur.pc, outcome);
        stat.update(cur.pc, prediction.outcome, outcome);

        observe(&BranchEvent {
            record: *cur,
            outcome,
            prediction,
            trained,
            weights: bp.weights(prediction.index),
            bias: bp.bias(prediction.index),
            offset: bp.table().entry_offset(prediction.index),
        });
    }
    stat
}
