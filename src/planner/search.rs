//! Per-actuator shortest-path search over `(timestep, fill-level bucket)`.
//!
//! One best node is kept per bucket and step (the bucket resolution trades optimality
//! for runtime); ties are broken by fewest transitions, then by the lexicographically
//! smallest operation-mode-id sequence, so identical inputs always produce the
//! identical schedule.

use std::cmp::Ordering;

use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    dynamics::StepDynamics,
    error::Constraint,
    model::{
        actuator::{Actuator, ActuatorStatus},
        leakage::LeakageBehaviour,
        range::NumberRange,
        system::SystemDescription,
        timeline::Timeline,
        timer::TimerState,
        transition::Transition,
    },
    ops::Interval,
    planner::{
        config::{PlannerConfig, TargetEnforcement},
        grid::Timestep,
    },
    prelude::*,
    quantity::{Cost, FillLevel, FillRate, Seconds, Watts},
    schedule::{ActuatorSchedule, FillLevelPoint, ScheduleInterval},
};

/// Search state attached to one `(timestep, bucket)` slot.
///
/// Everything the dynamics depend on travels as an immutable value along the edge;
/// nothing is mutated in place, which keeps the search replayable.
struct Node {
    parent: Option<usize>,

    /// Step this node is the outcome of; zero-length for the seed node.
    interval: Interval,

    /// System description the mode index refers to.
    system_index: usize,
    mode_index: usize,
    factor: f64,

    /// Instant until which the actuator is still in the unassigned transient state
    /// of a timed transition.
    transient_until: Option<DateTime<Utc>>,

    fill_level: FillLevel,
    timer_states: Box<[TimerState]>,
    cost: Cost,

    /// Accumulated squared distance to the target corridor (soft enforcement only).
    target_penalty: f64,

    n_transitions: u32,
}

/// Why candidate edges died at a timestep; the dominant reason names the binding
/// constraint when the whole layer dies.
#[derive(Default)]
struct Rejections {
    out_of_range: usize,
    timer_locked: usize,
    target: usize,
    transition_duration: usize,
    mode_vanished: usize,
}

impl Rejections {
    fn dominant(&self) -> Constraint {
        let ranked = [
            (self.out_of_range, Constraint::FillLevelRange),
            (self.timer_locked, Constraint::TimerLock),
            (self.target, Constraint::TargetProfile),
            (self.transition_duration, Constraint::TransitionDuration),
        ];
        ranked
            .into_iter()
            .max_by_key(|(count, _)| *count)
            .map_or(Constraint::FillLevelRange, |(_, constraint)| constraint)
    }
}

pub(crate) struct Search<'a> {
    pub grid: &'a [Timestep],
    pub systems: &'a Timeline<SystemDescription>,
    pub leakage: Option<&'a Timeline<LeakageBehaviour>>,
    pub status: &'a ActuatorStatus,
    pub config: &'a PlannerConfig,
}

impl Search<'_> {
    /// Run the search and decode the best path into the actuator's schedule.
    pub fn run(&self) -> Result<ActuatorSchedule> {
        let mut arena: Vec<Node> = Vec::new();
        let mut n_expanded: usize = 0;

        let seed_index = self.seed(&mut arena)?;
        let mut layer: Vec<usize> = vec![seed_index];

        for (step_index, step) in self.grid.iter().enumerate() {
            layer = self.advance(step, &mut arena, &layer, &mut n_expanded).map_err(
                |rejections| self.layer_died(step, step_index, &rejections),
            )?;
            if let Some(max_nodes) = self.config.max_nodes
                && n_expanded > max_nodes
            {
                return Err(Error::InfeasibleHorizon {
                    constraint: Constraint::SearchBudget,
                    at: step.interval.start,
                });
            }
        }

        let best = layer
            .iter()
            .copied()
            .reduce(|best, challenger| {
                if self.compare(&arena, challenger, best) == Ordering::Less {
                    challenger
                } else {
                    best
                }
            })
            .expect("every step leaves at least one node");
        debug!(
            actuator_id = %self.status.actuator_id,
            n_nodes = arena.len(),
            n_expanded,
            "search finished",
        );
        Ok(self.decode(&arena, best))
    }

    /// The initial condition, seeded from the live actuator status.
    fn seed(&self, arena: &mut Vec<Node>) -> Result<usize> {
        let first_step = self.grid.first().expect("the grid is never empty");
        let system_index = first_step.system_index;
        let actuator = self.actuator_at(system_index)?;
        let mode_index =
            actuator.mode_index(&self.status.active_operation_mode_id).ok_or_else(|| {
                Error::malformed(format!(
                    "active operation mode `{}` is not declared on actuator `{}`",
                    self.status.active_operation_mode_id, self.status.actuator_id,
                ))
            })?;
        let start = first_step.interval.start;
        arena.push(Node {
            parent: None,
            interval: Interval::new(start, start),
            system_index,
            mode_index,
            factor: self.status.operation_mode_factor,
            transient_until: None,
            fill_level: self.systems.get(system_index).storage.present_fill_level,
            timer_states: actuator.initial_timer_states(),
            cost: Cost::ZERO,
            target_penalty: 0.0,
            n_transitions: 0,
        });
        Ok(arena.len() - 1)
    }

    /// Expand one timestep; returns the surviving layer or the rejection tallies
    /// when nothing survives.
    #[expect(clippy::too_many_lines)]
    fn advance(
        &self,
        step: &Timestep,
        arena: &mut Vec<Node>,
        layer: &[usize],
        n_expanded: &mut usize,
    ) -> std::result::Result<Vec<usize>, Rejections> {
        let system = self.systems.get(step.system_index);
        let actuator = system
            .actuator(&self.status.actuator_id)
            .expect("the planner validated the actuator exists in every snapshot");
        let storage_range = system.storage.fill_level_range;
        let n_buckets = bucket_count(storage_range, self.config.fill_level_bucket_resolution);
        let mut buckets: Vec<Option<usize>> = vec![None; n_buckets + 1];
        let mut rejections = Rejections::default();

        let t = step.interval.start;
        let step_seconds = step.interval.len_seconds();
        let usage_rate = if step_seconds > Seconds::ZERO {
            FillRate(step.usage.0 / step_seconds.0)
        } else {
            FillRate::ZERO
        };
        let leakage = step
            .leakage_index
            .and_then(|index| self.leakage.map(|timeline| timeline.get(index)));

        for &node_index in layer {
            // A new system description redefines the machine: carry the mode over by id
            // and restart every timer (the new description declares its own timers).
            let (mode_index, timer_states) = {
                let node = &arena[node_index];
                if node.system_index == step.system_index {
                    (node.mode_index, node.timer_states.clone())
                } else {
                    let previous_actuator = self
                        .actuator_at(node.system_index)
                        .expect("the node was created from this snapshot");
                    let mode_id = &previous_actuator.operation_modes[node.mode_index].id;
                    match actuator.mode_index(mode_id) {
                        Some(mode_index) => (mode_index, actuator.initial_timer_states()),
                        None => {
                            rejections.mode_vanished += 1;
                            continue;
                        }
                    }
                }
            };

            for (target_mode_index, target_mode) in actuator.operation_modes.iter().enumerate() {
                let stay = target_mode_index == mode_index;
                if !stay
                    && target_mode.abnormal_condition_only
                    && !self.config.allow_abnormal_transitions
                {
                    continue;
                }

                let transitions: Vec<Option<&Transition>> = if stay {
                    vec![None]
                } else {
                    let from_id = &actuator.operation_modes[mode_index].id;
                    let mut edges = Vec::new();
                    for transition in &actuator.transitions {
                        if &transition.from != from_id || transition.to != target_mode.id {
                            continue;
                        }
                        if transition.abnormal_condition_only
                            && !self.config.allow_abnormal_transitions
                        {
                            continue;
                        }
                        if actuator.is_blocked(transition, &timer_states, t) {
                            rejections.timer_locked += 1;
                            continue;
                        }
                        if transition.transition_duration.unwrap_or_else(TimeDelta::zero)
                            > step.interval.len()
                        {
                            rejections.transition_duration += 1;
                            continue;
                        }
                        edges.push(Some(transition));
                    }
                    edges
                };

                let factors: Vec<f64> = if target_mode.uses_factor() {
                    self.config.factors().collect()
                } else {
                    vec![0.0]
                };

                for transition in transitions {
                    for &factor in &factors {
                        *n_expanded += 1;

                        let node = &arena[node_index];
                        let (timer_states, cost, n_transitions, transient_until) =
                            match transition {
                                Some(transition) => (
                                    actuator.fire_timers(transition, &timer_states, t),
                                    node.cost + transition.transition_costs.unwrap_or(Cost::ZERO),
                                    node.n_transitions + 1,
                                    transition
                                        .transition_duration
                                        .filter(|duration| *duration > TimeDelta::zero())
                                        .map(|duration| t + duration),
                                ),
                                None => {
                                    (timer_states.clone(), node.cost, node.n_transitions, None)
                                }
                            };

                        let outcome = self.simulate(
                            step,
                            target_mode_index,
                            factor,
                            transient_until,
                            leakage,
                            usage_rate,
                            storage_range,
                            node.fill_level,
                        );
                        let Ok(outcome) = outcome else {
                            rejections.out_of_range += 1;
                            continue;
                        };

                        let mut target_penalty = arena[node_index].target_penalty;
                        if let Some(target) = step.target {
                            let distance = target.distance(outcome.fill_level);
                            match self.config.target_enforcement {
                                TargetEnforcement::Hard => {
                                    if distance > FillLevel::ZERO {
                                        rejections.target += 1;
                                        continue;
                                    }
                                }
                                TargetEnforcement::Soft => {
                                    target_penalty += distance.0 * distance.0;
                                }
                            }
                        }

                        let candidate = Node {
                            parent: Some(node_index),
                            interval: step.interval,
                            system_index: step.system_index,
                            mode_index: target_mode_index,
                            factor,
                            transient_until,
                            fill_level: outcome.fill_level,
                            timer_states,
                            cost: cost + outcome.cost,
                            target_penalty,
                            n_transitions,
                        };

                        let bucket = bucket_index(storage_range, n_buckets, outcome.fill_level);
                        match buckets[bucket] {
                            None => {
                                arena.push(candidate);
                                buckets[bucket] = Some(arena.len() - 1);
                            }
                            Some(incumbent) => {
                                arena.push(candidate);
                                let challenger = arena.len() - 1;
                                if self.compare(arena, challenger, incumbent) == Ordering::Less {
                                    buckets[bucket] = Some(challenger);
                                }
                            }
                        }
                    }
                }
            }
        }

        let layer: Vec<usize> = buckets.into_iter().flatten().collect();
        if layer.is_empty() { Err(rejections) } else { Ok(layer) }
    }

    /// Integrate one edge, splitting off the transient part of a timed transition.
    #[expect(clippy::too_many_arguments)]
    fn simulate(
        &self,
        step: &Timestep,
        mode_index: usize,
        factor: f64,
        transient_until: Option<DateTime<Utc>>,
        leakage: Option<&LeakageBehaviour>,
        usage_rate: FillRate,
        storage_range: NumberRange<FillLevel>,
        fill_level: FillLevel,
    ) -> Result<crate::dynamics::StepOutcome> {
        let system = self.systems.get(step.system_index);
        let actuator = system
            .actuator(&self.status.actuator_id)
            .expect("validated earlier");
        let mode = &actuator.operation_modes[mode_index];

        let dynamics = |mode, interval, fill_level| {
            StepDynamics { mode, factor, leakage, usage_rate, storage_range }
                .integrate(interval, fill_level)
        };

        match transient_until {
            Some(until) => {
                let transient = dynamics(
                    None,
                    Interval::new(step.interval.start, until),
                    fill_level,
                )?;
                let rest = dynamics(
                    Some(mode),
                    Interval::new(until, step.interval.end),
                    transient.fill_level,
                )?;
                Ok(crate::dynamics::StepOutcome {
                    fill_level: rest.fill_level,
                    cost: transient.cost + rest.cost,
                })
            }
            None => dynamics(Some(mode), step.interval, fill_level),
        }
    }

    /// Total preference order: target penalty, cost, transition count, then the
    /// lexicographically smallest operation-mode-id sequence.
    fn compare(&self, arena: &[Node], lhs: usize, rhs: usize) -> Ordering {
        let left = &arena[lhs];
        let right = &arena[rhs];
        OrderedFloat(left.target_penalty)
            .cmp(&OrderedFloat(right.target_penalty))
            .then_with(|| left.cost.cmp(&right.cost))
            .then_with(|| left.n_transitions.cmp(&right.n_transitions))
            .then_with(|| self.mode_id_sequence(arena, lhs).cmp(&self.mode_id_sequence(arena, rhs)))
    }

    /// Operation-mode ids along the path from the seed to `index`.
    fn mode_id_sequence<'a>(&'a self, arena: &[Node], index: usize) -> Vec<&'a str> {
        let mut sequence = Vec::new();
        let mut current = Some(index);
        while let Some(index) = current {
            let node = &arena[index];
            let actuator =
                self.actuator_at(node.system_index).expect("validated earlier");
            sequence.push(actuator.operation_modes[node.mode_index].id.0.as_str());
            current = node.parent;
        }
        sequence.reverse();
        sequence
    }

    fn actuator_at(&self, system_index: usize) -> Result<&Actuator> {
        self.systems.get(system_index).actuator(&self.status.actuator_id).ok_or_else(|| {
            Error::malformed(format!(
                "actuator `{}` is not declared in the description valid from {}",
                self.status.actuator_id,
                self.systems.get(system_index).valid_from,
            ))
        })
    }

    fn layer_died(&self, step: &Timestep, step_index: usize, rejections: &Rejections) -> Error {
        let only_vanished = rejections.mode_vanished > 0
            && rejections.out_of_range == 0
            && rejections.timer_locked == 0
            && rejections.target == 0
            && rejections.transition_duration == 0;
        if only_vanished {
            return Error::malformed(format!(
                "no operation mode carries over into the description taking effect at {}",
                step.interval.start,
            ));
        }
        debug!(
            step_index,
            out_of_range = rejections.out_of_range,
            timer_locked = rejections.timer_locked,
            target = rejections.target,
            transition_duration = rejections.transition_duration,
            "every branch rejected",
        );
        Error::InfeasibleHorizon { constraint: rejections.dominant(), at: step.interval.start }
    }

    /// Walk the best path back and merge it into the output intervals.
    fn decode(&self, arena: &[Node], end_index: usize) -> ActuatorSchedule {
        let mut chain = Vec::new();
        let mut current = Some(end_index);
        while let Some(index) = current {
            let node = &arena[index];
            if node.parent.is_some() {
                chain.push(index);
            }
            current = node.parent;
        }
        chain.reverse();

        let seed = &arena[0];
        let mut fill_levels =
            vec![FillLevelPoint { at: seed.interval.start, fill_level: seed.fill_level }];
        let mut raw: Vec<ScheduleInterval> = Vec::new();
        let mut fill_before = seed.fill_level;
        for &index in &chain {
            let node = &arena[index];
            let actuator = self.actuator_at(node.system_index).expect("validated earlier");
            let mode = &actuator.operation_modes[node.mode_index];
            if let Some(until) = node.transient_until {
                raw.push(ScheduleInterval {
                    interval: Interval::new(node.interval.start, until),
                    operation_mode_id: None,
                    operation_mode_factor: node.factor,
                    expected_power: Watts::ZERO,
                });
                // A transition as long as the step leaves nothing to assign.
                let rest = node.interval.with_start(until);
                if !rest.is_empty() {
                    raw.push(ScheduleInterval {
                        interval: rest,
                        operation_mode_id: Some(mode.id.clone()),
                        operation_mode_factor: node.factor,
                        expected_power: mode.power_at(fill_before, node.factor),
                    });
                }
            } else {
                raw.push(ScheduleInterval {
                    interval: node.interval,
                    operation_mode_id: Some(mode.id.clone()),
                    operation_mode_factor: node.factor,
                    expected_power: mode.power_at(fill_before, node.factor),
                });
            }
            fill_levels.push(FillLevelPoint {
                at: node.interval.end,
                fill_level: node.fill_level,
            });
            fill_before = node.fill_level;
        }

        let intervals = raw
            .into_iter()
            .coalesce(|previous, next| {
                if previous.operation_mode_id == next.operation_mode_id
                    && OrderedFloat(previous.operation_mode_factor)
                        == OrderedFloat(next.operation_mode_factor)
                {
                    Ok(ScheduleInterval {
                        interval: Interval::new(previous.interval.start, next.interval.end),
                        ..previous
                    })
                } else {
                    Err((previous, next))
                }
            })
            .collect();

        ActuatorSchedule {
            actuator_id: self.status.actuator_id.clone(),
            intervals,
            fill_levels,
            cost: arena[end_index].cost,
        }
    }
}

fn bucket_count(range: NumberRange<FillLevel>, resolution: FillLevel) -> usize {
    let width = (range.max - range.min).0;
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_buckets = (width / resolution.0).ceil() as usize;
    n_buckets.max(1)
}

fn bucket_index(
    range: NumberRange<FillLevel>,
    n_buckets: usize,
    fill_level: FillLevel,
) -> usize {
    let width = (range.max - range.min).0;
    if width <= 0.0 {
        return 0;
    }
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let bucket = ((fill_level - range.min).0 / width * n_buckets as f64).floor() as usize;
    bucket.min(n_buckets)
}
