//! The planner's output artifact, owned by the caller and handed to the
//! serialization/transport layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    model::id::{ActuatorId, OperationModeId},
    ops::Interval,
    quantity::{Cost, FillLevel, Watts},
};

/// Planned operation over the whole horizon, one entry per actuator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schedule {
    pub horizon: Interval,
    pub actuators: Vec<ActuatorSchedule>,

    /// Running plus transition costs over all actuators.
    pub total_cost: Cost,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActuatorSchedule {
    pub actuator_id: ActuatorId,

    /// Ordered, non-overlapping, covering the horizon.
    pub intervals: Vec<ScheduleInterval>,

    /// Fill-level trajectory: the level at the horizon start and after every planning step.
    pub fill_levels: Vec<FillLevelPoint>,

    pub cost: Cost,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleInterval {
    pub interval: Interval,

    /// `None` while a timed transition is still in flight (transient state, no power).
    pub operation_mode_id: Option<OperationModeId>,

    pub operation_mode_factor: f64,

    /// Electric power draw expected at the interval start.
    pub expected_power: Watts,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FillLevelPoint {
    pub at: DateTime<Utc>,
    pub fill_level: FillLevel,
}

impl Schedule {
    #[must_use]
    pub fn actuator(&self, id: &ActuatorId) -> Option<&ActuatorSchedule> {
        self.actuators.iter().find(|schedule| &schedule.actuator_id == id)
    }
}

impl ActuatorSchedule {
    /// Operation mode assigned at `t`, if the instant falls within the horizon.
    #[must_use]
    pub fn mode_at(&self, t: DateTime<Utc>) -> Option<&OperationModeId> {
        self.intervals
            .iter()
            .find(|entry| entry.interval.contains(t))
            .and_then(|entry| entry.operation_mode_id.as_ref())
    }
}
