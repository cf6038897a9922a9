//! Tuning knobs and outcome types for [`crate::AStarSolver::solve`].

use std::time::Duration;

use rail_simulate::SimulatorOptions;
use rail_state::PartialState;

use crate::solution::Solution;

/// Descriptive tag for which [`crate::SuccessorStrategy`] a solve run used.
/// `AStarSolver` is generic over its strategy at compile time; this field
/// is carried alongside purely so a caller can record/report which one a
/// given `SolverOptions` value was built for, the way the source
/// framework's `SimConfig` carries `num_threads` even though the thread
/// pool itself is constructed elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    SingleEdge,
    NextTTD,
}

/// Tuning knobs for one `AStarSolver::solve` call.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverOptions {
    pub dt: f64,
    pub timeout: Duration,
    pub strategy: StrategyKind,
    /// Discard a successor whose simulator run reports a train has already
    /// missed its exit window, rather than let the search carry it forward
    /// only to prune it later at greater cost.
    pub consider_earliest_exit: bool,
    /// Tighten `vmax` on edges leading into a train's exit vertex.
    pub limit_speed_by_leaving_edges: bool,
    pub late_entry_possible: bool,
    pub late_exit_possible: bool,
    pub late_stop_possible: bool,
}

impl SolverOptions {
    /// The [`SimulatorOptions`] a `GreedySimulator::simulate` call derived
    /// from this `SolverOptions` should use.
    pub fn simulator_options(&self) -> SimulatorOptions {
        SimulatorOptions {
            time: rail_core::SimTimeConfig { dt: self.dt, ..rail_core::SimTimeConfig::default() },
            late_entry_possible: self.late_entry_possible,
            late_exit_possible: self.late_exit_possible,
            late_stop_possible: self.late_stop_possible,
        }
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            dt: rail_core::SimTimeConfig::DEFAULT_DT,
            timeout: Duration::from_secs(30),
            strategy: StrategyKind::SingleEdge,
            consider_earliest_exit: false,
            limit_speed_by_leaving_edges: false,
            late_entry_possible: false,
            late_exit_possible: false,
            late_stop_possible: false,
        }
    }
}

/// Outcome of a `solve()` call, per spec.md §4.7.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverStatus {
    /// All trains reached their exit with the lowest objective an
    /// admissible heuristic can certify.
    Optimal,
    /// The deadline passed before the search finished.
    Timeout,
    /// The whole reachable state space was exhausted without finding a
    /// state in which every train exits.
    Infeasible,
    /// The search could not even evaluate its own starting state.
    Unknown,
}

/// Result of an `AStarSolver::solve` call.
#[derive(Clone, Debug)]
pub struct SolverResult {
    pub status: SolverStatus,
    pub objective: Option<f64>,
    pub winning_state: Option<PartialState>,
    pub solution: Option<Solution>,
}

impl SolverResult {
    pub(crate) fn unknown() -> Self {
        Self { status: SolverStatus::Unknown, objective: None, winning_state: None, solution: None }
    }

    pub(crate) fn infeasible() -> Self {
        Self { status: SolverStatus::Infeasible, objective: None, winning_state: None, solution: None }
    }

    pub(crate) fn timeout_empty() -> Self {
        Self { status: SolverStatus::Timeout, objective: None, winning_state: None, solution: None }
    }
}
