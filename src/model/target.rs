use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{ops::Interval, quantity::FillLevel};

/// Externally supplied fill-level corridor over time.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FillLevelTargetProfile {
    pub start_time: DateTime<Utc>,
    pub elements: Vec<FillLevelTargetElement>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FillLevelTargetElement {
    #[serde(with = "crate::model::serde_time_delta")]
    pub duration: TimeDelta,

    /// Open-ended bounds: either side may be absent.
    #[serde(default)]
    pub lower_limit: Option<FillLevel>,
    #[serde(default)]
    pub upper_limit: Option<FillLevel>,
}

/// Target corridor for one planning step.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TargetRange {
    pub lower: Option<FillLevel>,
    pub upper: Option<FillLevel>,
}

impl TargetRange {
    #[must_use]
    pub fn contains(self, fill_level: FillLevel) -> bool {
        self.lower.is_none_or(|lower| fill_level >= lower)
            && self.upper.is_none_or(|upper| fill_level <= upper)
    }

    /// Distance to the corridor; zero inside it.
    pub fn distance(self, fill_level: FillLevel) -> FillLevel {
        if let Some(lower) = self.lower
            && fill_level < lower
        {
            return lower - fill_level;
        }
        if let Some(upper) = self.upper
            && fill_level > upper
        {
            return fill_level - upper;
        }
        FillLevel::ZERO
    }
}

impl FillLevelTargetProfile {
    fn intervals(&self) -> impl Iterator<Item = (Interval, &FillLevelTargetElement)> {
        let mut start = self.start_time;
        self.elements.iter().map(move |element| {
            let interval = Interval::new(start, start + element.duration);
            start = interval.end;
            (interval, element)
        })
    }

    /// Tightest corridor over `interval`: the greatest lower bound and the least upper
    /// bound among the overlapping elements. `None` when no element overlaps.
    #[must_use]
    pub fn range_over(&self, interval: Interval) -> Option<TargetRange> {
        let mut range: Option<TargetRange> = None;
        for (element_interval, element) in self.intervals() {
            if element_interval.intersect(interval).is_none() {
                continue;
            }
            let range = range.get_or_insert_with(TargetRange::default);
            if let Some(lower) = element.lower_limit {
                range.lower = Some(range.lower.map_or(lower, |current| current.max(lower)));
            }
            if let Some(upper) = element.upper_limit {
                range.upper = Some(range.upper.map_or(upper, |current| current.min(upper)));
            }
        }
        range.filter(|range| range.lower.is_some() || range.upper.is_some())
    }

    /// Instants where the corridor may change.
    pub fn boundaries(&self) -> impl Iterator<Item = DateTime<Utc>> {
        let mut next = Some(self.start_time);
        let mut elements = self.elements.iter();
        std::iter::from_fn(move || {
            let boundary = next?;
            next = elements.next().map(|element| boundary + element.duration);
            Some(boundary)
        })
    }
}
