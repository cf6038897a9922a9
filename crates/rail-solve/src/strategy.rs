//! `SuccessorStrategy` — how [`crate::AStarSolver`] branches one
//! [`PartialState`] into its children.
//!
//! Both strategies only ever grow one train's commitment per generated
//! child: `AStarSolver`'s open set holds full-width alternatives, not a
//! single train advancing in lockstep, so every train gets its own
//! independent set of successor edges each expansion.

use rail_core::kinematics::braking_distance;
use rail_core::{EdgeId, TrainId, VertexId};
use rail_instance::Instance;
use rail_simulate::SimulationOutcome;
use rail_state::PartialState;

/// Produces every legal child of one [`PartialState`].
pub trait SuccessorStrategy: Send + Sync {
    fn successors(&self, instance: &Instance, state: &PartialState, outcome: &SimulationOutcome) -> Vec<PartialState>;
}

/// Records passage through `edge`'s source vertex and, if `edge` opens a new
/// TTD section relative to `train`'s previous commitment, records entry into
/// that section's first-come order too.
fn commit_edge(instance: &Instance, state: &PartialState, train: TrainId, edge: EdgeId) -> PartialState {
    let prev_ttd = state.train_edges(train).last().and_then(|&e| instance.ttd_id(e));
    let new_ttd = instance.ttd_id(edge);

    let mut next = state.push_edge(train, edge);
    if let Ok(e) = instance.network.edge(edge) {
        next = next.insert_vertex_order(e.source, train);
    }
    if new_ttd.is_some() && new_ttd != prev_ttd {
        if let Some(ttd) = new_ttd {
            next = next.insert_ttd_order(ttd, train);
        }
    }
    next
}

/// Every initial path of at least braking length out of `vertex`, committed
/// edge by edge so each crossed TTD/vertex boundary is recorded.
fn initial_commitments(instance: &Instance, state: &PartialState, train: TrainId, vertex: VertexId, v0: f64, decel: f64) -> Vec<PartialState> {
    let braking = braking_distance(v0, decel).unwrap_or(0.0).max(0.0);
    instance
        .network
        .all_paths_of_length_starting_in_vertex(vertex, braking, &[])
        .into_iter()
        .map(|path| {
            path.edges.iter().fold(state.clone(), |acc, &edge| commit_edge(instance, &acc, train, edge))
        })
        .collect()
}

/// If the vertex `train`'s committed route currently ends at is one of the
/// valid stop vertices for its next due stop, the state with that stop
/// committed there. `None` otherwise — either there is no due stop left, or
/// this vertex isn't a candidate for it.
fn stop_here_successor(instance: &Instance, state: &PartialState, train: TrainId, end_vertex: VertexId) -> Option<PartialState> {
    let schedule = instance.timetable.schedule(train)?;
    let next_stop = schedule.stops.get(state.stop_positions(train).len())?;
    if !instance.possible_stop_vertices(train, next_stop.station).contains(&end_vertex) {
        return None;
    }
    let position_m: f64 = state
        .train_edges(train)
        .iter()
        .map(|&e| instance.network.edge(e).map(|edge| edge.length_m).unwrap_or(0.0))
        .sum();
    Some(state.commit_stop(train, position_m))
}

/// Appends exactly one edge to one train's commitment per generated child —
/// the finest-grained branching, and the default strategy (spec.md §4.7.1).
pub struct SingleEdge;

impl SuccessorStrategy for SingleEdge {
    fn successors(&self, instance: &Instance, state: &PartialState, outcome: &SimulationOutcome) -> Vec<PartialState> {
        let mut out = Vec::new();
        for (i, train) in instance.timetable.trains.iter().enumerate() {
            if outcome.exit_time[i].is_some() {
                continue;
            }
            let train_id = TrainId::try_from(i).expect("train index fits in TrainId");
            let schedule = match instance.timetable.schedule(train_id) {
                Some(s) => s,
                None => continue,
            };
            let committed = state.train_edges(train_id);

            let Some(&last_edge) = committed.last() else {
                out.extend(initial_commitments(instance, state, train_id, schedule.entry, schedule.v0, train.decel));
                continue;
            };

            let end_vertex = match instance.network.edge(last_edge) {
                Ok(e) => e.target,
                Err(_) => continue,
            };

            if let Some(stopped) = stop_here_successor(instance, state, train_id, end_vertex) {
                out.push(stopped);
            }

            if end_vertex == schedule.exit {
                continue;
            }
            for &next_edge in instance.network.successors(last_edge) {
                out.push(commit_edge(instance, state, train_id, next_edge));
            }
        }
        out
    }
}

/// Fast-forwards each train through an entire TTD section in one child —
/// coarser branching than [`SingleEdge`], trading search depth for a
/// smaller successor set per expansion (spec.md §4.7.1).
pub struct NextTTD;

impl SuccessorStrategy for NextTTD {
    fn successors(&self, instance: &Instance, state: &PartialState, outcome: &SimulationOutcome) -> Vec<PartialState> {
        let mut out = Vec::new();
        for (i, train) in instance.timetable.trains.iter().enumerate() {
            if outcome.exit_time[i].is_some() {
                continue;
            }
            let train_id = TrainId::try_from(i).expect("train index fits in TrainId");
            let schedule = match instance.timetable.schedule(train_id) {
                Some(s) => s,
                None => continue,
            };
            let committed = state.train_edges(train_id);

            let Some(&last_edge) = committed.last() else {
                out.extend(initial_commitments(instance, state, train_id, schedule.entry, schedule.v0, train.decel));
                continue;
            };

            let end_vertex = match instance.network.edge(last_edge) {
                Ok(e) => e.target,
                Err(_) => continue,
            };

            if let Some(stopped) = stop_here_successor(instance, state, train_id, end_vertex) {
                out.push(stopped);
            }

            if end_vertex == schedule.exit {
                continue;
            }
            for &first in instance.network.successors(last_edge) {
                let mut chain = vec![first];
                let mut cur = first;
                let section = instance.ttd_id(first);
                loop {
                    let succs = instance.network.successors(cur);
                    if succs.len() != 1 {
                        break;
                    }
                    let next = succs[0];
                    if instance.ttd_id(next) != section {
                        break;
                    }
                    chain.push(next);
                    cur = next;
                }
                let next_state = chain.iter().fold(state.clone(), |acc, &edge| commit_edge(instance, &acc, train_id, edge));
                out.push(next_state);
            }
        }
        out
    }
}
