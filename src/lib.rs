//! Schedule planner for S2 FRBC (Fill Rate Based Control) resources.
//!
//! Feed it the resource's system descriptions, leakage behaviours, usage forecast
//! and fill-level target profile, and it returns an operation-mode schedule over
//! the requested horizon together with the expected fill-level trajectory.

pub mod dynamics;
pub mod error;
pub mod model;
pub mod ops;
pub mod planner;
mod prelude;
pub mod quantity;
pub mod schedule;

pub use crate::{
    error::{Constraint, Error, Result},
    planner::{
        Planner,
        config::{PlannerConfig, TargetEnforcement},
    },
    schedule::Schedule,
};
