use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::quantity::FillLevel;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A timeline was queried before its first entry.
    #[error("no description applies at {queried} (the first one is valid from {first_valid_from})")]
    NoApplicableDescription { queried: DateTime<Utc>, first_valid_from: DateTime<Utc> },

    /// The fill level would leave the storage's allowed range.
    ///
    /// The planner uses this internally to prune branches; it only surfaces
    /// when every branch fails, wrapped into [`Error::InfeasibleHorizon`].
    #[error("fill level {fill_level} exits [{min}, {max}] at {at}")]
    OutOfRange { fill_level: FillLevel, min: FillLevel, max: FillLevel, at: DateTime<Utc> },

    /// No feasible schedule exists over the horizon.
    #[error("no feasible schedule: {constraint} is binding at {at}")]
    InfeasibleHorizon { constraint: Constraint, at: DateTime<Utc> },

    /// A referential invariant of the input is violated. Raised at load, never mid-search.
    #[error("malformed system description: {what}")]
    MalformedDescription { what: String },
}

/// The constraint that made the horizon infeasible.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Constraint {
    #[display("the storage fill-level range")]
    FillLevelRange,

    #[display("a blocking timer")]
    TimerLock,

    #[display("the fill-level target profile")]
    TargetProfile,

    #[display("a transition duration longer than the step")]
    TransitionDuration,

    #[display("the search node budget")]
    SearchBudget,
}

impl Error {
    pub fn malformed(what: impl Into<String>) -> Self {
        Self::MalformedDescription { what: what.into() }
    }
}
