use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ops::Interval,
    quantity::{FillLevel, FillRate},
};

/// Predicted exogenous fill-level consumption: an expected rate per element plus
/// symmetric confidence bands. Positive rates drain the storage.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UsageForecast {
    pub start_time: DateTime<Utc>,
    pub elements: Vec<UsageForecastElement>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UsageForecastElement {
    #[serde(with = "crate::model::serde_time_delta")]
    pub duration: TimeDelta,

    pub usage_rate_expected: FillRate,

    #[serde(default)]
    pub usage_rate_upper_limit: Option<FillRate>,
    #[serde(default)]
    pub usage_rate_lower_limit: Option<FillRate>,
    #[serde(default)]
    pub usage_rate_upper_95ppr: Option<FillRate>,
    #[serde(default)]
    pub usage_rate_lower_95ppr: Option<FillRate>,
    #[serde(default)]
    pub usage_rate_upper_68ppr: Option<FillRate>,
    #[serde(default)]
    pub usage_rate_lower_68ppr: Option<FillRate>,
}

/// Which forecast band the planner integrates; absent bands fall back to the expected rate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    #[default]
    Expected,
    UpperLimit,
    LowerLimit,
    Upper95,
    Lower95,
    Upper68,
    Lower68,
}

impl UsageForecastElement {
    pub fn rate(&self, band: Band) -> FillRate {
        let rate = match band {
            Band::Expected => None,
            Band::UpperLimit => self.usage_rate_upper_limit,
            Band::LowerLimit => self.usage_rate_lower_limit,
            Band::Upper95 => self.usage_rate_upper_95ppr,
            Band::Lower95 => self.usage_rate_lower_95ppr,
            Band::Upper68 => self.usage_rate_upper_68ppr,
            Band::Lower68 => self.usage_rate_lower_68ppr,
        };
        rate.unwrap_or(self.usage_rate_expected)
    }
}

impl UsageForecast {
    /// Element intervals, back to back from `start_time`.
    fn intervals(&self) -> impl Iterator<Item = (Interval, &UsageForecastElement)> {
        let mut start = self.start_time;
        self.elements.iter().map(move |element| {
            let interval = Interval::new(start, start + element.duration);
            start = interval.end;
            (interval, element)
        })
    }

    /// Integrated usage over `interval` for the chosen band.
    ///
    /// Time not covered by any element contributes nothing.
    pub fn usage_between(&self, interval: Interval, band: Band) -> FillLevel {
        self.intervals()
            .filter_map(|(element_interval, element)| {
                let overlap = element_interval.intersect(interval)?;
                Some(element.rate(band) * overlap.len_seconds())
            })
            .sum()
    }

    /// Instants where the usage rate may change; the planning grid cuts at each of them.
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

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    fn forecast() -> UsageForecast {
        UsageForecast {
            start_time: at(0),
            elements: vec![
                UsageForecastElement {
                    duration: TimeDelta::seconds(100),
                    usage_rate_expected: FillRate(0.1),
                    usage_rate_upper_limit: Some(FillRate(0.3)),
                    usage_rate_lower_limit: None,
                    usage_rate_upper_95ppr: None,
                    usage_rate_lower_95ppr: None,
                    usage_rate_upper_68ppr: None,
                    usage_rate_lower_68ppr: None,
                },
                UsageForecastElement {
                    duration: TimeDelta::seconds(100),
                    usage_rate_expected: FillRate(0.2),
                    usage_rate_upper_limit: None,
                    usage_rate_lower_limit: None,
                    usage_rate_upper_95ppr: None,
                    usage_rate_lower_95ppr: None,
                    usage_rate_upper_68ppr: None,
                    usage_rate_lower_68ppr: None,
                },
            ],
        }
    }

    #[test]
    fn integrates_across_element_boundary() {
        let usage = forecast().usage_between(Interval::new(at(50), at(150)), Band::Expected);
        assert_relative_eq!(usage.0, 0.1 * 50.0 + 0.2 * 50.0);
    }

    #[test]
    fn band_falls_back_to_expected_when_absent() {
        let forecast = forecast();
        let usage = forecast.usage_between(Interval::new(at(0), at(200)), Band::UpperLimit);
        // The first element has an upper limit, the second falls back to the expected rate.
        assert_relative_eq!(usage.0, 0.3 * 100.0 + 0.2 * 100.0);
    }

    #[test]
    fn uncovered_time_contributes_nothing() {
        let usage = forecast().usage_between(Interval::new(at(150), at(400)), Band::Expected);
        assert_relative_eq!(usage.0, 0.2 * 50.0);
    }

    #[test]
    fn boundaries_cover_every_element_edge() {
        let boundaries: Vec<_> = forecast().boundaries().collect();
        assert_eq!(boundaries, vec![at(0), at(100), at(200)]);
    }
}
