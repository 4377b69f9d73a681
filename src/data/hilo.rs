//! HiLo: a low/high value interval used for autoscaling.

use serde::{Deserialize, Serialize};

/// Minimum/maximum pair. NaN bounds mean "no data yet" and are ignored by
/// the merge helpers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HiLo {
    pub lo: f64,
    pub hi: f64,
}

impl Default for HiLo {
    fn default() -> Self {
        Self { lo: 0.0, hi: 1.0 }
    }
}

impl HiLo {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub const fn empty() -> Self {
        Self {
            lo: f64::NAN,
            hi: f64::NAN,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo <= self.hi
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Extend the interval so that it contains `value`. NaN values are skipped.
    pub fn merge_value(self, value: f64) -> Self {
        if value.is_nan() {
            return self;
        }
        if self.lo.is_nan() || self.hi.is_nan() {
            return Self::new(value, value);
        }
        Self::new(self.lo.min(value), self.hi.max(value))
    }

    /// Union of two intervals, each bound taken from whichever side is a number.
    pub fn merge(self, other: HiLo) -> Self {
        fn pick(a: f64, b: f64, f: fn(f64, f64) -> f64) -> f64 {
            match (a.is_nan(), b.is_nan()) {
                (false, false) => f(a, b),
                (false, true) => a,
                (true, false) => b,
                (true, true) => f64::NAN,
            }
        }
        Self::new(pick(self.lo, other.lo, f64::min), pick(self.hi, other.hi, f64::max))
    }

    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let merged = values
            .into_iter()
            .fold(Self::empty(), |acc, v| acc.merge_value(v));
        merged.is_valid().then_some(merged)
    }

    /// Interval symmetric about zero that contains this one.
    pub fn symmetric(self) -> Self {
        let limit = self.lo.abs().max(self.hi.abs());
        Self::new(-limit, limit)
    }

    /// Widen a zero-width interval so it can be mapped onto pixels.
    pub fn widened(self) -> Self {
        if self.span() > 0.0 {
            return self;
        }
        let pad = if self.lo == 0.0 { 1.0 } else { self.lo.abs() * 0.1 };
        Self::new(self.lo - pad, self.hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ignores_nan_bounds() {
        let a = HiLo::new(f64::NAN, 3.0);
        let b = HiLo::new(-1.0, f64::NAN);
        assert_eq!(a.merge(b), HiLo::new(-1.0, 3.0));
    }

    #[test]
    fn from_values_skips_nan() {
        let h = HiLo::from_values([2.0, f64::NAN, -4.0, 1.0]).unwrap();
        assert_eq!(h, HiLo::new(-4.0, 2.0));
        assert!(HiLo::from_values([f64::NAN]).is_none());
    }

    #[test]
    fn widened_constant_signal() {
        assert_eq!(HiLo::new(0.0, 0.0).widened(), HiLo::new(-1.0, 1.0));
        let w = HiLo::new(5.0, 5.0).widened();
        assert!((w.lo - 4.5).abs() < 1e-12 && (w.hi - 5.5).abs() < 1e-12);
    }
}
