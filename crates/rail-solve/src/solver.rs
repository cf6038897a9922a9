//! `AStarSolver` — open/closed-set search over [`PartialState`], using
//! [`GreedySimulator`] as the cost oracle (spec.md §4.7.2).
//!
//! Each popped state is re-simulated from scratch rather than incrementally
//! updated: `PartialState` only ever grows (edges, stops, orders are
//! appended, never rewritten), so a from-scratch `simulate()` call is cheap
//! relative to the bookkeeping an incremental re-run would need, and it
//! keeps the solver from carrying any simulation state of its own between
//! expansions.

use std::cmp::Ordering;
use std::time::Instant;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashSet;
#[cfg(not(feature = "fx-hash"))]
use std::collections::HashSet;

use rail_instance::Instance;
use rail_simulate::{GreedySimulator, SimulateError, SimulationOutcome, SimulatorOptions};
use rail_state::PartialState;

use crate::error::SolveResult;
use crate::heuristic::Heuristic;
use crate::observer::{NoopSolverObserver, SolverObserver};
use crate::options::{SolverOptions, SolverResult, SolverStatus};
use crate::solution::build_solution;
use crate::strategy::SuccessorStrategy;

#[cfg(feature = "fx-hash")]
type ClosedSet = FxHashSet<PartialState>;
#[cfg(not(feature = "fx-hash"))]
type ClosedSet = HashSet<PartialState>;

struct OpenEntry {
    f: f64,
    g: f64,
    seq: u64,
    state: PartialState,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}
impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// `BinaryHeap` is a max-heap; reversing `f` (and, on ties, `seq`) turns it
// into the min-heap A* needs, popping the lowest f first in FIFO order
// among equal-f entries.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* search over `PartialState`, parameterized by its heuristic and
/// successor-generation strategy.
pub struct AStarSolver<H: Heuristic, S: SuccessorStrategy> {
    heuristic: H,
    strategy: S,
}

impl<H: Heuristic, S: SuccessorStrategy> AStarSolver<H, S> {
    pub fn new(heuristic: H, strategy: S) -> Self {
        Self { heuristic, strategy }
    }

    pub fn solve(&self, instance: &Instance, options: &SolverOptions, deadline: Instant) -> SolveResult<SolverResult> {
        self.solve_with_observer(instance, options, deadline, &mut NoopSolverObserver)
    }

    /// As [`Self::solve`], but invokes `observer`'s hooks at each expansion,
    /// goal discovery, prune, and timeout.
    pub fn solve_with_observer(
        &self,
        instance: &Instance,
        options: &SolverOptions,
        deadline: Instant,
        observer: &mut impl SolverObserver,
    ) -> SolveResult<SolverResult> {
        let num_trains = instance.timetable.trains.len();
        let num_ttd = instance.network.unbreakable_sections().len();
        let num_vertices = instance.network.vertex_count();
        let sim_options = options.simulator_options();
        let simulator = GreedySimulator::new();

        let start = PartialState::empty(num_trains, num_ttd, num_vertices);
        let start_outcome = match simulator.simulate(instance, &start, &sim_options) {
            Ok(o) => o,
            Err(SimulateError::InfeasibleSchedule { .. } | SimulateError::Deadlock) => return Ok(SolverResult::infeasible()),
            Err(_) => return Ok(SolverResult::unknown()),
        };
        let h0 = self.heuristic.estimate(instance, &start, &start_outcome, options)?;

        let mut open = std::collections::BinaryHeap::new();
        let mut closed: ClosedSet = Default::default();
        let mut seq = 0u64;
        open.push(OpenEntry { f: h0, g: 0.0, seq, state: start });

        let mut best_feasible: Option<(f64, PartialState)> = None;

        while let Some(OpenEntry { state, .. }) = open.pop() {
            if Instant::now() >= deadline {
                observer.on_timeout();
                return Ok(match best_feasible {
                    Some((g, s)) => self.finish(instance, &sim_options, s, g, SolverStatus::Timeout)?,
                    None => SolverResult::timeout_empty(),
                });
            }

            if closed.contains(&state) {
                continue;
            }
            closed.insert(state.clone());

            let outcome = match simulator.simulate(instance, &state, &sim_options) {
                Ok(o) => o,
                Err(_) => {
                    observer.on_prune(&state);
                    continue;
                }
            };

            let g_actual: f64 = outcome.delay.iter().sum();
            let all_exited = outcome.exit_time.iter().all(Option::is_some);
            if all_exited {
                observer.on_goal(&state);
                return Ok(self.finish(instance, &sim_options, state, g_actual, SolverStatus::Optimal)?);
            }

            best_feasible = match best_feasible {
                Some((bg, _)) if bg <= g_actual => best_feasible,
                _ => Some((g_actual, state.clone())),
            };

            observer.on_expand(&state);
            let pending: Vec<PartialState> = self
                .strategy
                .successors(instance, &state, &outcome)
                .into_iter()
                .filter(|succ| !closed.contains(succ))
                .collect();
            for (succ, succ_outcome) in Self::simulate_successors(instance, &sim_options, pending) {
                let succ_outcome = match succ_outcome {
                    Some(o) => o,
                    None => {
                        observer.on_prune(&succ);
                        continue;
                    }
                };
                if options.consider_earliest_exit
                    && succ_outcome.exit_time.iter().zip(&instance.timetable.schedules).any(|(exit, sched)| {
                        exit.is_some_and(|t| t > sched.exit_window.1 as f64) && !options.late_exit_possible
                    })
                {
                    observer.on_prune(&succ);
                    continue;
                }
                let g2: f64 = succ_outcome.delay.iter().sum();
                let h2 = self.heuristic.estimate(instance, &succ, &succ_outcome, options)?;
                if h2.is_infinite() {
                    observer.on_prune(&succ);
                    continue;
                }
                seq += 1;
                open.push(OpenEntry { f: g2 + h2, g: g2, seq, state: succ });
            }
        }

        // The reachable state space is exhausted and no goal was ever found:
        // genuinely infeasible, regardless of how far any single branch got.
        Ok(SolverResult::infeasible())
    }

    /// Runs the cost oracle over every pending successor, pairing each with
    /// its outcome (`None` if infeasible/errored, mirroring the old inline
    /// prune check). `PartialState` is `Rc`-backed (cheap clones within one
    /// thread, not `Send`), so this stays sequential; `open`/`closed`/
    /// `observer` are untouched until the caller walks the results back.
    fn simulate_successors(
        instance: &Instance,
        sim_options: &SimulatorOptions,
        pending: Vec<PartialState>,
    ) -> Vec<(PartialState, Option<SimulationOutcome>)> {
        let simulator = GreedySimulator::new();
        pending
            .into_iter()
            .map(|succ| {
                let outcome = simulator.simulate(instance, &succ, sim_options).ok();
                (succ, outcome)
            })
            .collect()
    }

    fn finish(
        &self,
        instance: &Instance,
        sim_options: &rail_simulate::SimulatorOptions,
        state: PartialState,
        objective: f64,
        status: SolverStatus,
    ) -> SolveResult<SolverResult> {
        let solution = build_solution(instance, &state, sim_options)?;
        Ok(SolverResult {
            status,
            objective: Some(objective),
            winning_state: Some(state),
            solution: Some(solution),
        })
    }
}
