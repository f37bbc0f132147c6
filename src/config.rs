//! Growth and sizing knobs for [`Vector`](crate::vector::Vector).

/// Sizing parameters a vector is built with.
///
/// The growth factor is `growth_numerator / growth_denominator` and is always
/// strictly greater than one, so a full vector makes progress on every growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VecConfig {
    /// Capacity used by `Vector::new` and restored by `clear` (default: 16).
    pub default_capacity: usize,

    /// Growth factor numerator (default: 3).
    pub growth_numerator: usize,

    /// Growth factor denominator (default: 2).
    pub growth_denominator: usize,
}

impl VecConfig {
    pub const DEFAULT_CAPACITY: usize = 16;
    pub const DEFAULT_GROWTH_NUMERATOR: usize = 3;
    pub const DEFAULT_GROWTH_DENOMINATOR: usize = 2;

    /// Default growth with a custom default capacity.
    pub const fn new(default_capacity: usize) -> Self {
        Self {
            default_capacity,
            growth_numerator: Self::DEFAULT_GROWTH_NUMERATOR,
            growth_denominator: Self::DEFAULT_GROWTH_DENOMINATOR,
        }
    }

    /// Replaces the growth factor.
    ///
    /// A zero denominator is treated as one and a factor `<= 1` is bumped to
    /// `(denominator + 1) / denominator`.
    pub const fn with_growth(mut self, numerator: usize, denominator: usize) -> Self {
        let den = if denominator == 0 { 1 } else { denominator };
        let num = if numerator <= den { den + 1 } else { numerator };
        self.growth_numerator = num;
        self.growth_denominator = den;
        self
    }

    /// Capacity after one growth step: `max(1, ceil(cap * num / den))`.
    ///
    /// Returns `None` if the result does not fit in a `usize`.
    pub fn next_capacity(&self, cap: usize) -> Option<usize> {
        let scaled = cap.checked_mul(self.growth_numerator)?;
        let grown = scaled.div_ceil(self.growth_denominator);
        // integer rounding can stall tiny capacities for factors close to one
        Some(grown.max(cap + 1).max(1))
    }
}

impl Default for VecConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
