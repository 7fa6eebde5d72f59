use std::fmt::{Debug, Formatter};
use std::ops::Sub;

/// Closed numeric interval `[min, max]` as S2's `NumberRange`.
///
/// A degenerate range (`min == max`) denotes a fixed value.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NumberRange<T: Copy> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + Debug> Debug for NumberRange<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}, {:?}]", self.min, self.max)
    }
}

impl<T: Copy> NumberRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: T) -> Self {
        Self { min: value, max: value }
    }
}

impl<T: Copy + PartialOrd> NumberRange<T> {
    #[must_use]
    pub fn contains(self, value: T) -> bool {
        (self.min <= value) && (value <= self.max)
    }

    pub fn clamp(self, mut value: T) -> T {
        if value < self.min {
            value = self.min;
        }
        if value > self.max {
            value = self.max;
        }
        value
    }
}

impl<T> NumberRange<T>
where
    T: Copy + Sub<Output = T> + std::ops::Add<Output = T> + std::ops::Mul<f64, Output = T>,
{
    /// Value at `factor` ∈ `[0, 1]` between `min` and `max`.
    pub fn at_factor(self, factor: f64) -> T {
        self.min + (self.max - self.min) * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::FillRate;

    #[test]
    fn contains_is_closed() {
        let range = NumberRange::new(0.0, 100.0);
        assert!(range.contains(0.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(100.1));
    }

    #[test]
    fn at_factor_interpolates() {
        let range = NumberRange::new(FillRate(1.0), FillRate(3.0));
        assert_eq!(range.at_factor(0.0), FillRate(1.0));
        assert_eq!(range.at_factor(0.5), FillRate(2.0));
        assert_eq!(range.at_factor(1.0), FillRate(3.0));
    }

    #[test]
    fn degenerate_range_is_insensitive_to_factor() {
        let range = NumberRange::fixed(FillRate(0.25));
        assert_eq!(range.at_factor(0.0), range.at_factor(1.0));
    }
}
