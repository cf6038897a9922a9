//! Integration tests for `AStarSolver`.

use std::time::{Duration, Instant};

use rail_core::TrainId;
use rail_instance::Instance;
use rail_network::{RailNetworkBuilder, VertexKind};
use rail_timetable::{Schedule, Timetable, Train};

use crate::heuristic::{Heuristic, Simple, Zero};
use crate::options::{SolverOptions, SolverStatus};
use crate::solver::AStarSolver;
use crate::strategy::{NextTTD, SingleEdge};

fn train(id: u32, length_m: f64, vmax: f64, accel: f64, decel: f64) -> Train {
    Train { id: TrainId(id), name: format!("T{id}"), length_m, vmax, accel, decel, bidirectional: false }
}

fn schedule(entry: rail_core::VertexId, exit: rail_core::VertexId, exit_window: (u32, u32)) -> Schedule {
    Schedule { entry, exit, entry_window: (0, 60), exit_window, v0: 0.0, vn: 0.0, stops: Vec::new() }
}

/// A single `TtdBorder`-to-`TtdBorder` edge, long enough that a train has
/// room to accelerate to `vmax` and brake back to a stop.
fn single_edge_instance(length_m: f64, max_speed: f64, exit_window: (u32, u32)) -> Instance {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_vertex("b", VertexKind::TtdBorder, None);
    b.add_edge("a", "b", length_m, max_speed, false, 0.0, 0.0);
    let net = b.build().unwrap();
    let a = net.vertex_by_name("a").unwrap();
    let b_v = net.vertex_by_name("b").unwrap();
    let timetable = Timetable {
        trains: vec![train(0, 100.0, max_speed, 2.0, 2.0)],
        schedules: vec![schedule(a, b_v, exit_window)],
        stations: Vec::new(),
    };
    Instance::build(net, timetable).unwrap()
}

/// Two `TtdBorder` stations joined through one shared `NonBorder` vertex,
/// wired in both directions — the same conflict topology as
/// `rail-simulate`'s `shared_ttd_network`, so two opposing trains must be
/// serialized through the shared section.
fn meeting_instance() -> Instance {
    let mut b = RailNetworkBuilder::new();
    b.add_vertex("a", VertexKind::TtdBorder, None);
    b.add_vertex("m", VertexKind::NonBorder, None);
    b.add_vertex("b", VertexKind::TtdBorder, None);
    b.add_edge("a", "m", 500.0, 20.0, false, 0.0, 0.0);
    b.add_edge("m", "b", 500.0, 20.0, false, 0.0, 0.0);
    b.add_edge("m", "a", 500.0, 20.0, false, 0.0, 0.0);
    b.add_edge("b", "m", 500.0, 20.0, false, 0.0, 0.0);
    b.add_successor(("a", "m"), ("m", "b"));
    b.add_successor(("b", "m"), ("m", "a"));
    let net = b.build().unwrap();
    let a = net.vertex_by_name("a").unwrap();
    let b_v = net.vertex_by_name("b").unwrap();
    let timetable = Timetable {
        trains: vec![train(0, 50.0, 20.0, 2.0, 2.0), train(1, 50.0, 20.0, 2.0, 2.0)],
        schedules: vec![schedule(a, b_v, (0, 6000)), schedule(b_v, a, (0, 6000))],
        stations: Vec::new(),
    };
    Instance::build(net, timetable).unwrap()
}

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(30)
}

#[test]
fn zero_heuristic_is_always_zero() {
    let instance = single_edge_instance(1000.0, 50.0, (0, 6000));
    let state = rail_state::PartialState::empty(1, 0, instance.network.vertex_count());
    let outcome = rail_simulate::GreedySimulator::new()
        .simulate(&instance, &state, &SolverOptions::default().simulator_options())
        .unwrap();
    let h = Zero.estimate(&instance, &state, &outcome, &SolverOptions::default()).unwrap();
    assert_eq!(h, 0.0);
}

#[test]
fn simple_heuristic_is_positive_before_departure_and_zero_at_exit() {
    let instance = single_edge_instance(1000.0, 50.0, (0, 6000));
    let options = SolverOptions::default();
    let empty = rail_state::PartialState::empty(1, 0, instance.network.vertex_count());
    let outcome = rail_simulate::GreedySimulator::new().simulate(&instance, &empty, &options.simulator_options()).unwrap();
    let h = Simple.estimate(&instance, &empty, &outcome, &options).unwrap();
    assert!(h > 0.0, "a train that has not yet departed needs strictly positive time to reach its exit");

    let edge = instance.network.out_edges(instance.network.vertex_by_name("a").unwrap())[0];
    let committed = empty.push_edge(TrainId(0), edge);
    let outcome = rail_simulate::GreedySimulator::new().simulate(&instance, &committed, &options.simulator_options()).unwrap();
    if outcome.exit_time[0].is_none() {
        let h2 = Simple.estimate(&instance, &committed, &outcome, &options).unwrap();
        assert_eq!(h2, 0.0, "committing the only edge lands the train's front at its exit vertex");
    }
}

#[test]
fn single_train_single_edge_solves_optimally_with_either_heuristic() {
    let instance = single_edge_instance(1000.0, 50.0, (0, 6000));
    let options = SolverOptions::default();

    let zero_result = AStarSolver::new(Zero, SingleEdge).solve(&instance, &options, far_deadline()).unwrap();
    assert_eq!(zero_result.status, SolverStatus::Optimal);
    let simple_result = AStarSolver::new(Simple, SingleEdge).solve(&instance, &options, far_deadline()).unwrap();
    assert_eq!(simple_result.status, SolverStatus::Optimal);

    assert!((zero_result.objective.unwrap() - simple_result.objective.unwrap()).abs() < 1e-6);

    let solution = simple_result.solution.unwrap();
    assert!(solution.train_routed[0]);
    assert!(!solution.route[0].is_empty());
    assert!(!solution.pos[0].is_empty());
}

#[test]
fn next_ttd_strategy_agrees_with_single_edge() {
    let instance = single_edge_instance(1000.0, 50.0, (0, 6000));
    let options = SolverOptions::default();

    let a = AStarSolver::new(Simple, SingleEdge).solve(&instance, &options, far_deadline()).unwrap();
    let b = AStarSolver::new(Simple, NextTTD).solve(&instance, &options, far_deadline()).unwrap();
    assert_eq!(a.status, SolverStatus::Optimal);
    assert_eq!(b.status, SolverStatus::Optimal);
    assert!((a.objective.unwrap() - b.objective.unwrap()).abs() < 1e-6);
}

#[test]
fn two_opposing_trains_serialize_through_shared_section() {
    let instance = meeting_instance();
    let options = SolverOptions::default();
    let result = AStarSolver::new(Simple, SingleEdge).solve(&instance, &options, far_deadline()).unwrap();
    assert_eq!(result.status, SolverStatus::Optimal);

    let solution = result.solution.unwrap();
    assert!(solution.train_routed[0] && solution.train_routed[1]);
}

#[test]
fn solve_past_deadline_reports_timeout() {
    let instance = meeting_instance();
    let options = SolverOptions::default();
    let already_passed = Instant::now() - Duration::from_secs(1);
    let result = AStarSolver::new(Simple, SingleEdge).solve(&instance, &options, already_passed).unwrap();
    assert_eq!(result.status, SolverStatus::Timeout);
}

#[test]
fn unreachable_exit_is_infeasible() {
    // An exit window so tight the train cannot possibly arrive in time, and
    // late exits are not permitted, so the simulator rejects every state.
    let instance = single_edge_instance(5000.0, 10.0, (0, 1));
    let options = SolverOptions::default();
    let result = AStarSolver::new(Simple, SingleEdge).solve(&instance, &options, far_deadline()).unwrap();
    assert_eq!(result.status, SolverStatus::Infeasible);
}
