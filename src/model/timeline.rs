use chrono::{DateTime, Utc};

use crate::prelude::*;

/// Snapshot that is in force from a point in time until superseded.
pub trait ValidFrom {
    fn valid_from(&self) -> DateTime<Utc>;
}

/// Ordered sequence of snapshots; the one active at `t` has the greatest `valid_from ≤ t`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Timeline<T>(Vec<T>);

impl<T: ValidFrom> Timeline<T> {
    /// Build a timeline, requiring strictly increasing `valid_from` values.
    pub fn new(mut entries: Vec<T>) -> Result<Self> {
        entries.sort_by_key(ValidFrom::valid_from);
        if entries.windows(2).any(|pair| pair[0].valid_from() >= pair[1].valid_from()) {
            return Err(Error::malformed(
                "timeline entries must have strictly increasing `valid_from` timestamps",
            ));
        }
        Ok(Self(entries))
    }

    /// Snapshot in force at `t`, by binary search.
    pub fn active_at(&self, t: DateTime<Utc>) -> Result<(usize, &T)> {
        let n_before = self.0.partition_point(|entry| entry.valid_from() <= t);
        match n_before.checked_sub(1) {
            Some(index) => Ok((index, &self.0[index])),
            None => Err(Error::NoApplicableDescription {
                queried: t,
                first_valid_from: self
                    .0
                    .first()
                    .map(ValidFrom::valid_from)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry(DateTime<Utc>);

    impl ValidFrom for Entry {
        fn valid_from(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn active_at_picks_greatest_valid_from_not_after() {
        let timeline = Timeline::new(vec![Entry(at(0)), Entry(at(100)), Entry(at(200))]).unwrap();
        assert_eq!(timeline.active_at(at(0)).unwrap().0, 0);
        assert_eq!(timeline.active_at(at(99)).unwrap().0, 0);
        assert_eq!(timeline.active_at(at(100)).unwrap().0, 1);
        assert_eq!(timeline.active_at(at(500)).unwrap().0, 2);
    }

    #[test]
    fn querying_before_first_entry_fails() {
        let timeline = Timeline::new(vec![Entry(at(100))]).unwrap();
        assert!(matches!(
            timeline.active_at(at(99)),
            Err(Error::NoApplicableDescription { .. })
        ));
    }

    #[test]
    fn duplicate_valid_from_is_rejected() {
        assert!(matches!(
            Timeline::new(vec![Entry(at(0)), Entry(at(0))]),
            Err(Error::MalformedDescription { .. })
        ));
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let timeline = Timeline::new(vec![Entry(at(100)), Entry(at(0))]).unwrap();
        assert_eq!(timeline.active_at(at(50)).unwrap().0, 0);
    }
}
