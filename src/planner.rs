//! The planner facade: validates the inputs, discretizes the horizon and searches
//! each actuator's schedule.

pub mod config;
pub(crate) mod grid;
mod search;

use std::time::Instant;

use bon::Builder;
use rayon::prelude::*;

use crate::{
    model::{
        actuator::ActuatorStatus,
        forecast::UsageForecast,
        leakage::LeakageBehaviour,
        system::SystemDescription,
        target::FillLevelTargetProfile,
        timeline::Timeline,
    },
    ops::Interval,
    planner::config::PlannerConfig,
    prelude::*,
    schedule::{ActuatorSchedule, Schedule},
};

/// Builds a [`Schedule`] out of the resource's FRBC messages.
///
/// Actuators are planned independently and in parallel; their fill-level dynamics
/// share the storage, the leakage behaviour and the usage forecast.
#[derive(Builder)]
pub struct Planner<'a> {
    system_descriptions: &'a Timeline<SystemDescription>,
    leakage_behaviours: Option<&'a Timeline<LeakageBehaviour>>,
    usage_forecast: Option<&'a UsageForecast>,
    fill_level_target_profile: Option<&'a FillLevelTargetProfile>,
    actuator_statuses: &'a [ActuatorStatus],
    config: PlannerConfig,
}

impl Planner<'_> {
    /// Plan the whole horizon.
    ///
    /// # Errors
    ///
    /// Fails when the inputs do not validate, when no description covers the horizon
    /// start, or when no feasible schedule exists (see [`Error::InfeasibleHorizon`]).
    #[instrument(skip_all, fields(n_actuators = self.actuator_statuses.len()))]
    pub fn plan(&self) -> Result<Schedule> {
        let start_time = Instant::now();
        self.validate()?;

        let grid = grid::build(
            &self.config,
            self.system_descriptions,
            self.leakage_behaviours,
            self.usage_forecast,
            self.fill_level_target_profile,
        )?;
        debug!(n_steps = grid.len(), "discretized the horizon");

        let actuators: Vec<ActuatorSchedule> = self
            .actuator_statuses
            .par_iter()
            .map(|status| {
                search::Search {
                    grid: &grid,
                    systems: self.system_descriptions,
                    leakage: self.leakage_behaviours,
                    status,
                    config: &self.config,
                }
                .run()
            })
            .collect::<Result<_>>()?;

        let schedule = Schedule {
            horizon: Interval::new(self.config.horizon_start, self.config.horizon_end),
            total_cost: actuators.iter().map(|actuator| actuator.cost).sum(),
            actuators,
        };
        info!(
            elapsed = ?start_time.elapsed(),
            total_cost = %schedule.total_cost,
            "planning finished",
        );
        Ok(schedule)
    }

    fn validate(&self) -> Result {
        self.config.validate()?;
        if self.system_descriptions.is_empty() {
            return Err(Error::malformed("at least one system description is required"));
        }
        for system in self.system_descriptions.iter() {
            system.validate()?;
            // The search carries each actuator across description changes by id.
            for status in self.actuator_statuses {
                if system.actuator(&status.actuator_id).is_none() {
                    return Err(Error::malformed(format!(
                        "actuator `{}` is missing from the description valid from {}",
                        status.actuator_id, system.valid_from,
                    )));
                }
            }
        }
        let (_, first) = self.system_descriptions.active_at(self.config.horizon_start)?;
        for status in self.actuator_statuses {
            first.validate_status(status)?;
        }
        Ok(())
    }
}
