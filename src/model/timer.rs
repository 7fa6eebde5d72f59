use chrono::{DateTime, TimeDelta, Utc};

use crate::model::id::TimerId;

/// Cooldown/dwell guard declared on an actuator.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct Timer {
    pub id: TimerId,

    #[serde(default)]
    pub diagnostic_label: Option<String>,

    /// Seconds the timer runs once started.
    #[serde(with = "crate::model::serde_time_delta")]
    pub duration: TimeDelta,

    /// Instant an already-running timer finishes, as reported by the device;
    /// absent when the timer has never been started.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Runtime state of one timer, carried as a value along search edges.
///
/// `None` means "never started": the timer is permanently inactive until its first start.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TimerState {
    pub finished_at: Option<DateTime<Utc>>,
}

impl TimerState {
    pub const NEVER_STARTED: Self = Self { finished_at: None };

    /// A timer is active at `t` iff `t < finished_at`.
    #[must_use]
    pub fn is_active(self, t: DateTime<Utc>) -> bool {
        self.finished_at.is_some_and(|finished_at| t < finished_at)
    }

    /// Start the timer at `t`; pure, the previous state is untouched.
    pub fn start(self, timer: &Timer, t: DateTime<Utc>) -> Self {
        Self { finished_at: Some(t + timer.duration) }
    }
}
