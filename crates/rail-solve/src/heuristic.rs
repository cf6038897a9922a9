//! `Heuristic` — admissible lower bounds on remaining travel time, used by
//! [`crate::AStarSolver`] to order its open set.
//!
//! Grounded on the source framework's remaining-distance estimators: the
//! cheapest admissible bound is "assume every train runs its own best-case
//! kinematic profile from here to its exit, ignoring every other train." A
//! heuristic never sees another train's state, so it can only ever
//! underestimate the true completion cost once headway and capacity
//! conflicts are folded in by the simulator — exactly the property A*
//! needs.

use rail_core::kinematics::time_to_exit_objective;
use rail_instance::Instance;
use rail_simulate::SimulationOutcome;
use rail_state::PartialState;

use crate::error::SolveResult;
use crate::options::SolverOptions;

/// Estimates the remaining cost to reach a state where every train has
/// exited, given the simulator's read of the current state.
pub trait Heuristic: Send + Sync {
    fn estimate(
        &self,
        instance: &Instance,
        state: &PartialState,
        outcome: &SimulationOutcome,
        options: &SolverOptions,
    ) -> SolveResult<f64>;
}

/// The trivial heuristic: always zero. Turns `AStarSolver` into plain
/// uniform-cost search — useful as a correctness baseline against
/// [`Simple`], since both must agree on the optimal objective.
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(
        &self,
        _instance: &Instance,
        _state: &PartialState,
        _outcome: &SimulationOutcome,
        _options: &SolverOptions,
    ) -> SolveResult<f64> {
        Ok(0.0)
    }
}

/// Sums, over every train that has not yet exited, the time
/// [`time_to_exit_objective`] predicts it needs to reach its schedule exit
/// — starting from wherever its committed route currently ends (or its
/// entry vertex, if it has not committed anything yet), at its current
/// speed (or its scheduled entry speed), capped at its own `vmax`, and
/// required to arrive at `vn`.
///
/// The distance term comes from `instance.network.shortest_path`, not
/// `Instance::shortest_path_time` — the latter only tabulates travel
/// *time*, while [`time_to_exit_objective`] needs the shortest-path
/// *length* to run its own kinematic profile over.
///
/// When `options.limit_speed_by_leaving_edges` is set, the cap passed to
/// the shortest-path search is further limited to the slowest of the edges
/// entering the train's exit vertex, so the estimate accounts for the
/// train having to slow down onto whatever track it leaves through.
pub struct Simple;

impl Heuristic for Simple {
    fn estimate(
        &self,
        instance: &Instance,
        state: &PartialState,
        outcome: &SimulationOutcome,
        options: &SolverOptions,
    ) -> SolveResult<f64> {
        let mut total = 0.0;
        for (i, train) in instance.timetable.trains.iter().enumerate() {
            if outcome.exit_time[i].is_some() {
                continue;
            }
            let train_id = rail_core::TrainId::try_from(i).expect("train index fits in TrainId");
            let schedule = match instance.timetable.schedule(train_id) {
                Some(schedule) => schedule,
                None => continue,
            };

            let committed = state.train_edges(train_id);
            let (from_edges, v0, end_vertex): (Vec<_>, f64, _) = if let Some(&last) = committed.last() {
                let last_edge = instance.network.edge(last)?;
                (
                    instance.network.out_edges(last_edge.target).to_vec(),
                    outcome.final_v[i],
                    last_edge.target,
                )
            } else {
                (instance.network.out_edges(schedule.entry).to_vec(), schedule.v0, schedule.entry)
            };

            if end_vertex == schedule.exit {
                continue;
            }
            if from_edges.is_empty() {
                return Ok(f64::INFINITY);
            }

            let targets = instance.network.edges_entering(schedule.exit);
            let mut cap_speed = train.vmax;
            if options.limit_speed_by_leaving_edges {
                let leaving_cap = targets
                    .iter()
                    .filter_map(|&e| instance.network.edge(e).ok())
                    .map(|e| e.max_speed)
                    .fold(f64::INFINITY, f64::min);
                cap_speed = cap_speed.min(leaving_cap);
            }
            let Some(path) = instance.network.shortest_path_between_sets(&from_edges, &targets, cap_speed) else {
                return Ok(f64::INFINITY);
            };

            let remaining =
                time_to_exit_objective(v0, train.vmax, schedule.vn, path.length_m, train.accel, train.decel, 0.0)?;
            if remaining.is_infinite() {
                return Ok(f64::INFINITY);
            }
            total += remaining;
        }
        Ok(total)
    }
}
