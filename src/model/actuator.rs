use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        id::{ActuatorId, OperationModeId, TimerId},
        operation_mode::OperationMode,
        timer::{Timer, TimerState},
        transition::Transition,
    },
    prelude::*,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Commodity {
    Electricity,
    Gas,
    Heat,
    Oil,
}

/// One finite-state machine of the resource: states are operation modes,
/// edges are timer-guarded transitions.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Actuator {
    pub id: ActuatorId,

    #[serde(default)]
    pub diagnostic_label: Option<String>,

    pub supported_commodities: Vec<Commodity>,
    pub operation_modes: Vec<OperationMode>,

    #[serde(default)]
    pub transitions: Vec<Transition>,

    #[serde(default)]
    pub timers: Vec<Timer>,
}

/// Live state of the actuator at planning time; seeds the search's initial condition.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ActuatorStatus {
    pub actuator_id: ActuatorId,
    pub active_operation_mode_id: OperationModeId,

    /// Position within the active mode's ranges, `[0, 1]`.
    pub operation_mode_factor: f64,

    #[serde(default)]
    pub previous_operation_mode_id: Option<OperationModeId>,

    #[serde(default)]
    pub transition_timestamp: Option<DateTime<Utc>>,
}

impl Actuator {
    /// S2 entities cross-reference by id; the planner resolves those links to
    /// indices once, here.
    #[must_use]
    pub fn mode_index(&self, id: &OperationModeId) -> Option<usize> {
        self.operation_modes.iter().position(|mode| &mode.id == id)
    }

    #[must_use]
    pub fn timer_index(&self, id: &TimerId) -> Option<usize> {
        self.timers.iter().position(|timer| &timer.id == id)
    }

    /// Timer bank as reported by the device: a timer with a `finished_at` is still
    /// running, the rest have never been started.
    #[must_use]
    pub fn initial_timer_states(&self) -> Box<[TimerState]> {
        self.timers.iter().map(|timer| TimerState { finished_at: timer.finished_at }).collect()
    }

    /// Transitions that may legally fire out of `from_mode` at `t`.
    ///
    /// A transition is legal iff it leaves the current mode, none of its blocking timers is
    /// active, and it is not reserved for abnormal conditions (unless `allow_abnormal`).
    /// Staying in the current mode is always legal and is not represented here.
    pub fn legal_transitions<'a>(
        &'a self,
        from_mode: usize,
        timer_states: &'a [TimerState],
        t: DateTime<Utc>,
        allow_abnormal: bool,
    ) -> impl Iterator<Item = &'a Transition> {
        let from_id = &self.operation_modes[from_mode].id;
        self.transitions.iter().filter(move |transition| {
            &transition.from == from_id
                && (allow_abnormal || !transition.abnormal_condition_only)
                && !self.is_blocked(transition, timer_states, t)
        })
    }

    pub(crate) fn is_blocked(
        &self,
        transition: &Transition,
        timer_states: &[TimerState],
        t: DateTime<Utc>,
    ) -> bool {
        transition.blocking_timers.iter().any(|timer_id| {
            self.timer_index(timer_id)
                .is_some_and(|timer_index| timer_states[timer_index].is_active(t))
        })
    }

    /// Arm the transition's start timers at `t`, returning the updated bank.
    pub(crate) fn fire_timers(
        &self,
        transition: &Transition,
        timer_states: &[TimerState],
        t: DateTime<Utc>,
    ) -> Box<[TimerState]> {
        let mut updated: Box<[TimerState]> = timer_states.into();
        for timer_id in &transition.start_timers {
            if let Some(timer_index) = self.timer_index(timer_id) {
                updated[timer_index] = updated[timer_index].start(&self.timers[timer_index], t);
            }
        }
        updated
    }

    /// Fail fast on dangling identity references, before the planner ever runs.
    pub fn validate(&self) -> Result {
        for transition in &self.transitions {
            for mode_id in [&transition.from, &transition.to] {
                if self.mode_index(mode_id).is_none() {
                    return Err(Error::malformed(format!(
                        "transition `{}` of actuator `{}` references unknown operation mode `{mode_id}`",
                        transition.id, self.id,
                    )));
                }
            }
            for timer_id in transition.start_timers.iter().chain(&transition.blocking_timers) {
                if self.timer_index(timer_id).is_none() {
                    return Err(Error::malformed(format!(
                        "transition `{}` of actuator `{}` references unknown timer `{timer_id}`",
                        transition.id, self.id,
                    )));
                }
            }
        }
        for mode in &self.operation_modes {
            if mode.elements.is_empty() {
                return Err(Error::malformed(format!(
                    "operation mode `{}` of actuator `{}` has no elements",
                    mode.id, self.id,
                )));
            }
        }
        Ok(())
    }
}
