use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta, Utc};

use crate::quantity::Seconds;

/// Half-open time range: `start` inclusive, `end` exclusive.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, serde::Serialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub const fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn contains(self, instant: DateTime<Utc>) -> bool {
        (self.start <= instant) && (instant < self.end)
    }

    #[must_use]
    pub fn len(self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    pub fn len_seconds(self) -> Seconds {
        Seconds::from(self.len())
    }

    /// Overlap of the two intervals, if any.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn contains_is_half_open() {
        let interval = Interval::new(at(0), at(60));
        assert!(interval.contains(at(0)));
        assert!(interval.contains(at(59)));
        assert!(!interval.contains(at(60)));
    }

    #[test]
    fn intersect_overlapping() {
        let lhs = Interval::new(at(0), at(60));
        let rhs = Interval::new(at(30), at(90));
        assert_eq!(lhs.intersect(rhs), Some(Interval::new(at(30), at(60))));
    }

    #[test]
    fn intersect_disjoint() {
        let lhs = Interval::new(at(0), at(30));
        let rhs = Interval::new(at(30), at(60));
        assert_eq!(lhs.intersect(rhs), None);
    }
}
