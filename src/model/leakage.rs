use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{range::NumberRange, timeline::ValidFrom},
    quantity::{FillLevel, FillRate},
};

/// Passive fill-level drift, piecewise by fill level, timeline-valued like the
/// system description.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LeakageBehaviour {
    pub valid_from: DateTime<Utc>,
    pub elements: Vec<LeakageBehaviourElement>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LeakageBehaviourElement {
    pub fill_level_range: NumberRange<FillLevel>,

    /// Positive values drain the storage.
    pub leakage_rate: FillRate,
}

impl ValidFrom for LeakageBehaviour {
    fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }
}

impl LeakageBehaviour {
    /// Element in force at `fill_level`, with the same edge fallback as mode elements.
    #[must_use]
    pub fn element_at(&self, fill_level: FillLevel) -> &LeakageBehaviourElement {
        self.elements
            .iter()
            .find(|element| element.fill_level_range.contains(fill_level))
            .unwrap_or_else(|| {
                let first = self.elements.first().expect("leakage behaviour has elements");
                if fill_level < first.fill_level_range.min {
                    first
                } else {
                    self.elements.last().expect("leakage behaviour has elements")
                }
            })
    }

    pub fn rate_at(&self, fill_level: FillLevel) -> FillRate {
        self.element_at(fill_level).leakage_rate
    }
}
