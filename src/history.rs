
use bitvec::prelude::*;
use crate::branch::Outcome;

/// A global history register.
///
/// Bit 0 is the most recent outcome and bit `len - 1` the oldest. A set bit
/// means 'taken'. The only mutation is [GlobalHistory::push].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalHistory {
    data: BitVec<usize, Lsb0>,
}

// NOTE: Printed most-recent-first, so the leftmost character is bit 0.
impl std::fmt::Display for GlobalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .collect();
        write!(f, "{}", x)
    }
}

impl GlobalHistory {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero (not taken).
    pub fn new(len: usize) -> Self {
        Self { data: bitvec![usize, Lsb0; 0; len] }
    }

    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Read-only view of the register, most recent outcome first.
    pub fn data(&self) -> &BitSlice { self.data.as_bitslice() }

    /// Returns the outcome recorded `n` branches ago (0 is the newest).
    pub fn get(&self, n: usize) -> Option<Outcome> {
        self.data.get(n).map(|b| Outcome::from(*b))
    }

    /// Returns the recorded outcomes, most recent first.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.data.iter().by_vals().map(Outcome::from).collect()
    }

    /// Record a new outcome.
    /// Every bit moves one place toward the tail and the oldest is discarded.
    pub fn push(&mut self, outcome: Outcome) {
        if self.data.is_empty() {
            return;
        }
        self.data.shift_right(1);
        self.data.set(0, outcome.into());
    }

    /// Clear the register back to all not-taken.
    pub fn clear(&mut self) {
        self.data.fill(false);
    }
}
