//! `Solution` — the dense, per-train trajectory [`crate::AStarSolver`]
//! hands back once every train has exited (spec.md §2.8/§3).

use rail_core::{EdgeId, TrainId};
use rail_instance::Instance;
use rail_simulate::{GreedySimulator, SimulatorObserver, SimulatorOptions};
use rail_state::PartialState;

use crate::error::SolveResult;

/// `(time_s, value)` — one sample of a piecewise-linear per-train series.
pub type Sample = (f64, f64);

/// A winning state's routes and dense trajectories.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    /// Whether train `t` ever committed a route, indexed by `TrainId`.
    pub train_routed: Vec<bool>,
    /// Committed edges for train `t`, indexed by `TrainId`.
    pub route: Vec<Vec<EdgeId>>,
    /// Front-position samples for train `t`, indexed by `TrainId`.
    pub pos: Vec<Vec<Sample>>,
    /// Speed samples for train `t`, indexed by `TrainId`.
    pub speed: Vec<Vec<Sample>>,
}

/// Records every step boundary's `(tau, front, v)` triple per train.
struct TrajectoryRecorder {
    pos: Vec<Vec<Sample>>,
    speed: Vec<Vec<Sample>>,
}

impl TrajectoryRecorder {
    fn new(num_trains: usize) -> Self {
        Self { pos: vec![Vec::new(); num_trains], speed: vec![Vec::new(); num_trains] }
    }
}

impl SimulatorObserver for TrajectoryRecorder {
    fn on_step(&mut self, tau: f64, front: &[f64], v: &[f64]) {
        for i in 0..self.pos.len() {
            self.pos[i].push((tau, front[i]));
            self.speed[i].push((tau, v[i]));
        }
    }
}

/// Re-runs `state` through the simulator once more, this time recording the
/// full trajectory, and assembles the result into a [`Solution`].
pub fn build_solution(instance: &Instance, state: &PartialState, options: &SimulatorOptions) -> SolveResult<Solution> {
    let num_trains = instance.timetable.trains.len();
    let mut recorder = TrajectoryRecorder::new(num_trains);
    GreedySimulator::new().simulate_with_observer(instance, state, options, &mut recorder)?;

    let mut train_routed = Vec::with_capacity(num_trains);
    let mut route = Vec::with_capacity(num_trains);
    for i in 0..num_trains {
        let train_id = TrainId::try_from(i).expect("train index fits in TrainId");
        let edges = state.train_edges(train_id).to_vec();
        train_routed.push(!edges.is_empty());
        route.push(edges);
    }

    Ok(Solution { train_routed, route, pos: recorder.pos, speed: recorder.speed })
}
