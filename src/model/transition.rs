use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{
    model::id::{OperationModeId, TimerId, TransitionId},
    quantity::Cost,
};

/// Guarded edge between two operation modes of the same actuator.
///
/// Staying in a mode never requires a transition; an actuator only declares the
/// mode *changes* it supports.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Transition {
    pub id: TransitionId,
    pub from: OperationModeId,
    pub to: OperationModeId,

    /// Timers armed when this transition fires.
    #[serde(default)]
    pub start_timers: Vec<TimerId>,

    /// Timers that must all be inactive for this transition to be legal.
    #[serde(default)]
    pub blocking_timers: Vec<TimerId>,

    #[serde(default)]
    pub transition_costs: Option<Cost>,

    /// Time spent in an unassigned transient state (no power, no fill rate) before
    /// the target mode is reached.
    #[serde(default, with = "crate::model::serde_opt_time_delta")]
    pub transition_duration: Option<TimeDelta>,

    /// Only legal during fault recovery.
    #[serde(default)]
    pub abnormal_condition_only: bool,
}
