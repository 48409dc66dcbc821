//! A table of perceptrons indexed by branch address.

use crate::predictor::*;

/// A fixed-size table of [Perceptron].
///
/// The number of entries is derived from the storage budget in the
/// [PerceptronConfig]. Distinct branches are allowed to alias onto the same
/// entry: the table trades some accuracy for bounded storage.
#[derive(Clone, Debug)]
pub struct PredictorTable {
    cfg: PerceptronConfig,
    data: Vec<Perceptron>,
}
impl PredictorTable {
    /// Create a table with every perceptron reset.
    pub fn new(cfg: PerceptronConfig) -> Self {
        Self {
            data: vec![Perceptron::new(cfg); cfg.num_perceptrons()],
            cfg,
        }
    }

    /// Returns the number of entries in the table.
    pub fn size(&self) -> usize { self.data.len() }

    /// Map a branch address to an entry.
    ///
    /// The two low bits are dropped (instructions are word-aligned), and the
    /// remaining bits are reduced modulo the table size.
    pub fn index(&self, pc: u32) -> usize {
        (pc >> 2) as usize % self.size()
    }

    /// Returns a reference to an entry in the table.
    pub fn get(&self, idx: usize) -> &Perceptron {
        &self.data[idx]
    }

    /// Returns a mutable reference to an entry in the table.
    pub fn get_mut(&mut self, idx: usize) -> &mut Perceptron {
        &mut self.data[idx]
    }

    /// Byte offset of an entry when the table is laid out in flat memory.
    pub fn entry_offset(&self, idx: usize) -> usize {
        idx * self.cfg.storage_per_perceptron() / 8
    }

    pub fn iter(&self) -> impl Iterator<Item = &Perceptron> {
        self.data.iter()
    }

    /// Reset every entry.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(Perceptron::reset);
    }
}
