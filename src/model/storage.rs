use serde::{Deserialize, Serialize};

use crate::{model::range::NumberRange, quantity::FillLevel};

/// The storage behind the actuators (e.g. the battery pack).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StorageDescription {
    #[serde(default)]
    pub diagnostic_label: Option<String>,

    /// Human label of the fill-level unit, e.g. `"SoC %"`.
    #[serde(default)]
    pub fill_level_label: Option<String>,

    /// Allowed fill-level band; the planner never schedules outside it.
    pub fill_level_range: NumberRange<FillLevel>,

    /// Measured fill level at planning time.
    pub present_fill_level: FillLevel,

    pub provides_leakage_behaviour: bool,
    pub provides_fill_level_target_profile: bool,
    pub provides_usage_forecast: bool,
}
