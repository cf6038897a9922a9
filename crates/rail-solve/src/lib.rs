//! `rail-solve` — A* search over [`rail_state::PartialState`], using
//! [`rail_simulate::GreedySimulator`] as the cost oracle.
//!
//! # Open/closed-set search
//!
//! ```text
//! open  = { empty_state }, keyed by f(S) = g(S) + h(S)
//! loop:
//!   ① Pop  — lowest-f state S not already in closed.
//!   ② Run  — GreedySimulator::simulate(S); discard S if infeasible.
//!   ③ Goal — every train exited? return S as the winner.
//!   ④ Expand — SuccessorStrategy::successors(S); push each with a
//!              finite heuristic that isn't already closed.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|--------------------------------------------------------------|
//! | `fx-hash`  | Backs the closed set with `rustc_hash::FxHashSet`.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rail_solve::{AStarSolver, NoopSolverObserver, Simple, SingleEdge, SolverOptions};
//! use std::time::{Duration, Instant};
//!
//! let solver = AStarSolver::new(Simple, SingleEdge);
//! let deadline = Instant::now() + Duration::from_secs(30);
//! let result = solver.solve(&instance, &SolverOptions::default(), deadline)?;
//! ```

pub mod error;
pub mod heuristic;
pub mod observer;
pub mod options;
pub mod solution;
pub mod solver;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use error::{SolveError, SolveResult};
pub use heuristic::{Heuristic, Simple, Zero};
pub use observer::{NoopSolverObserver, SolverObserver};
pub use options::{SolverOptions, SolverResult, SolverStatus, StrategyKind};
pub use solution::Solution;
pub use solver::AStarSolver;
pub use strategy::{NextTTD, SingleEdge, SuccessorStrategy};
