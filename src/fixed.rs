//! Fixed-width signed integers with hardware-style wraparound.
//!
//! Weights and the weighted sum of a perceptron are registers with a fixed
//! number of bits. When an update leaves the representable range, the value
//! is folded onto the opposite end of the range:
//!
//! - above the maximum by `k`, the result is `min + (k - 1)`
//! - below the minimum by `k`, the result is `max - (k - 1)`
//!
//! This is computed explicitly with [`wrap`]; host integer overflow is never
//! relied upon.

use std::fmt;

/// Largest value representable in a signed `bits`-wide register.
pub const fn max_value(bits: u32) -> i32 {
    (1 << (bits - 1)) - 1
}

/// Smallest value representable in a signed `bits`-wide register.
pub const fn min_value(bits: u32) -> i32 {
    -(1 << (bits - 1))
}

/// Returns 'true' if `x` fits in a signed `bits`-wide register.
pub fn in_range(x: i64, bits: u32) -> bool {
    x >= i64::from(min_value(bits)) && x <= i64::from(max_value(bits))
}

/// Fold some out-of-range value back into a signed `bits`-wide register.
///
/// Repeating the fold until the value is representable lands on the unique
/// in-range value congruent to `x` modulo `2^bits`, so the result is
/// computed directly. In-range values are returned unchanged.
pub fn wrap(x: i64, bits: u32) -> i32 {
    let min = i128::from(min_value(bits));
    let span = 1i128 << bits;
    // Always within [min, max]
    ((i128::from(x) - min).rem_euclid(span) + min) as i32
}

/// A signed register of some fixed width (at most 31 bits).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedInt {
    bits: u32,
    val: i32,
}

impl fmt::Debug for FixedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}i{}", self.val, self.bits)
    }
}

impl fmt::Display for FixedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val)
    }
}

impl FixedInt {
    /// Create a register holding `val`, wrapped into range.
    pub fn new(bits: u32, val: i32) -> Self {
        debug_assert!((1..=31).contains(&bits));
        Self { bits, val: wrap(i64::from(val), bits) }
    }

    /// Create a register holding zero.
    pub fn zero(bits: u32) -> Self {
        Self::new(bits, 0)
    }

    pub fn bits(&self) -> u32 { self.bits }
    pub fn value(&self) -> i32 { self.val }
    pub fn max(&self) -> i32 { max_value(self.bits) }
    pub fn min(&self) -> i32 { min_value(self.bits) }

    /// Add `rhs` to the register. Returns 'true' if the result wrapped.
    pub fn add_wrapping(&mut self, rhs: i32) -> bool {
        self.set_wrapping(i64::from(self.val) + i64::from(rhs))
    }

    /// Overwrite the register with `x`. Returns 'true' if the result wrapped.
    pub fn set_wrapping(&mut self, x: impl Into<i64>) -> bool {
        let x = x.into();
        let wrapped = !in_range(x, self.bits);
        self.val = wrap(x, self.bits);
        wrapped
    }

    /// Set the register to zero.
    pub fn clear(&mut self) {
        self.val = 0;
    }
}
