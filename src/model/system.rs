use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        actuator::{Actuator, ActuatorStatus},
        storage::StorageDescription,
        timeline::ValidFrom,
    },
    prelude::*,
};

/// One snapshot of the resource's capabilities, in force from `valid_from`
/// until superseded by the next snapshot.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SystemDescription {
    pub valid_from: DateTime<Utc>,
    pub actuators: Vec<Actuator>,
    pub storage: StorageDescription,
}

impl ValidFrom for SystemDescription {
    fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }
}

impl SystemDescription {
    #[must_use]
    pub fn actuator(&self, id: &crate::model::id::ActuatorId) -> Option<&Actuator> {
        self.actuators.iter().find(|actuator| &actuator.id == id)
    }

    /// Referential and numeric sanity checks; see the error taxonomy.
    pub fn validate(&self) -> Result {
        let range = self.storage.fill_level_range;
        if !(range.min.0.is_finite() && range.max.0.is_finite()) || range.min > range.max {
            return Err(Error::malformed(format!(
                "storage fill-level range {range:?} is not a finite [min, max] interval"
            )));
        }
        for actuator in &self.actuators {
            actuator.validate()?;
        }
        Ok(())
    }

    /// Check that a live status refers to modes this description declares.
    pub fn validate_status(&self, status: &ActuatorStatus) -> Result {
        let Some(actuator) = self.actuator(&status.actuator_id) else {
            return Err(Error::malformed(format!(
                "status references unknown actuator `{}`",
                status.actuator_id
            )));
        };
        if actuator.mode_index(&status.active_operation_mode_id).is_none() {
            return Err(Error::malformed(format!(
                "status of actuator `{}` references unknown active operation mode `{}`",
                status.actuator_id, status.active_operation_mode_id,
            )));
        }
        if !(0.0..=1.0).contains(&status.operation_mode_factor) {
            return Err(Error::malformed(format!(
                "operation mode factor {} of actuator `{}` is outside [0, 1]",
                status.operation_mode_factor, status.actuator_id,
            )));
        }
        Ok(())
    }
}
