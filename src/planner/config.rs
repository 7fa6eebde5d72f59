use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};

use crate::{model::forecast::Band, prelude::*, quantity::FillLevel};

/// How the fill-level target profile constrains the search.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TargetEnforcement {
    /// States outside the target corridor are rejected.
    #[default]
    Hard,

    /// Deviation is penalized ahead of cost, but never rejected.
    Soft,
}

/// Recognized planner options.
#[derive(Builder, Clone, Debug)]
pub struct PlannerConfig {
    pub horizon_start: DateTime<Utc>,
    pub horizon_end: DateTime<Utc>,

    /// Base grid step. The grid additionally cuts at forecast/target element boundaries
    /// and at every `valid_from` of the description timelines; pick a resolution fine
    /// enough for the shortest timer duration.
    pub step_resolution: TimeDelta,

    /// Width of one fill-level bucket in the search space. Finer buckets trade runtime
    /// for schedule quality.
    pub fill_level_bucket_resolution: FillLevel,

    #[builder(default)]
    pub usage_forecast_band: Band,

    #[builder(default)]
    pub target_enforcement: TargetEnforcement,

    /// Let the search use `abnormal_condition_only` transitions (fault recovery).
    #[builder(default = false)]
    pub allow_abnormal_transitions: bool,

    /// Number of stratification layers for non-degenerate fill-rate/power ranges:
    /// the operation-mode factor is enumerated as `0/n, 1/n, …, n/n`.
    #[builder(default = 1)]
    pub factor_layers: usize,

    /// Abort the search once this many nodes were expanded; exhaustion is reported
    /// as an infeasible horizon naming the budget.
    pub max_nodes: Option<usize>,
}

impl PlannerConfig {
    pub fn validate(&self) -> Result {
        if self.horizon_end <= self.horizon_start {
            return Err(Error::malformed(format!(
                "planning horizon {:?}..{:?} is empty",
                self.horizon_start, self.horizon_end,
            )));
        }
        if self.step_resolution <= TimeDelta::zero() {
            return Err(Error::malformed("step resolution must be positive"));
        }
        if self.fill_level_bucket_resolution <= FillLevel::ZERO {
            return Err(Error::malformed("fill-level bucket resolution must be positive"));
        }
        if self.factor_layers == 0 {
            return Err(Error::malformed("factor layers must be at least 1"));
        }
        Ok(())
    }

    /// The enumerated operation-mode factors.
    pub(crate) fn factors(&self) -> impl Iterator<Item = f64> + Clone {
        let layers = self.factor_layers;
        #[expect(clippy::cast_precision_loss)]
        (0..=layers).map(move |layer| layer as f64 / layers as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_span_zero_to_one() {
        let config = PlannerConfig::builder()
            .horizon_start(DateTime::UNIX_EPOCH)
            .horizon_end(DateTime::UNIX_EPOCH + TimeDelta::hours(1))
            .step_resolution(TimeDelta::minutes(5))
            .fill_level_bucket_resolution(FillLevel(1.0))
            .factor_layers(4)
            .build();
        let factors: Vec<f64> = config.factors().collect();
        assert_eq!(factors, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn empty_horizon_is_rejected() {
        let config = PlannerConfig::builder()
            .horizon_start(DateTime::UNIX_EPOCH)
            .horizon_end(DateTime::UNIX_EPOCH)
            .step_resolution(TimeDelta::minutes(5))
            .fill_level_bucket_resolution(FillLevel(1.0))
            .build();
        assert!(matches!(config.validate(), Err(Error::MalformedDescription { .. })));
    }
}
