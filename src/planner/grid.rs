//! Discretization of the planning horizon.

use chrono::{DateTime, Utc};

use crate::{
    model::{
        forecast::UsageForecast,
        leakage::LeakageBehaviour,
        system::SystemDescription,
        target::{FillLevelTargetProfile, TargetRange},
        timeline::Timeline,
    },
    ops::Interval,
    planner::config::PlannerConfig,
    prelude::*,
    quantity::FillLevel,
};

/// One planning step with everything in force over it already resolved.
#[derive(Clone, Debug)]
pub(crate) struct Timestep {
    pub interval: Interval,

    /// Index into the system description timeline.
    pub system_index: usize,

    /// Index into the leakage timeline; `None` when leakage does not apply.
    pub leakage_index: Option<usize>,

    /// Integrated forecast usage over the step, for the configured band.
    pub usage: FillLevel,

    /// Target corridor the fill level must (hard) or should (soft) end the step in.
    pub target: Option<TargetRange>,
}

/// Cut the horizon into steps: a fixed grid at the configured resolution, plus a cut at
/// every forecast/target element boundary and every `valid_from` of either timeline.
pub(crate) fn build(
    config: &PlannerConfig,
    systems: &Timeline<SystemDescription>,
    leakage: Option<&Timeline<LeakageBehaviour>>,
    forecast: Option<&UsageForecast>,
    target: Option<&FillLevelTargetProfile>,
) -> Result<Vec<Timestep>> {
    let horizon = Interval::new(config.horizon_start, config.horizon_end);

    let mut boundaries: Vec<DateTime<Utc>> = Vec::new();
    let mut t = horizon.start;
    while t < horizon.end {
        boundaries.push(t);
        t += config.step_resolution;
    }
    boundaries.push(horizon.end);
    boundaries.extend(systems.iter().map(|system| system.valid_from));
    if let Some(leakage) = leakage {
        boundaries.extend(leakage.iter().map(|behaviour| behaviour.valid_from));
    }
    if let Some(forecast) = forecast {
        boundaries.extend(forecast.boundaries());
    }
    if let Some(target) = target {
        boundaries.extend(target.boundaries());
    }
    boundaries.retain(|boundary| horizon.contains(*boundary) || *boundary == horizon.end);
    boundaries.sort_unstable();
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|pair| {
            let interval = Interval::new(pair[0], pair[1]);
            let (system_index, system) = systems.active_at(interval.start)?;
            let storage = &system.storage;
            // The storage flags gate which behaviours apply under this description.
            let leakage_index = if storage.provides_leakage_behaviour {
                leakage.and_then(|timeline| {
                    timeline.active_at(interval.start).ok().map(|(index, _)| index)
                })
            } else {
                None
            };
            let usage = if storage.provides_usage_forecast {
                forecast.map_or(FillLevel::ZERO, |forecast| {
                    forecast.usage_between(interval, config.usage_forecast_band)
                })
            } else {
                FillLevel::ZERO
            };
            let target = if storage.provides_fill_level_target_profile {
                target.and_then(|profile| profile.range_over(interval))
            } else {
                None
            };
            Ok(Timestep { interval, system_index, leakage_index, usage, target })
        })
        .collect()
}
