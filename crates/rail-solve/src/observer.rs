//! Search observer trait for progress reporting and data collection.

use rail_state::PartialState;

/// Callbacks invoked by [`crate::AStarSolver::solve_with_observer`] at key
/// points in the open/closed search loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — expansion counter
///
/// ```rust,ignore
/// struct ExpansionCounter { n: u64 }
///
/// impl SolverObserver for ExpansionCounter {
///     fn on_expand(&mut self, _state: &PartialState) {
///         self.n += 1;
///     }
/// }
/// ```
pub trait SolverObserver {
    /// Called when a state is popped off the open set and about to be
    /// expanded into successors.
    fn on_expand(&mut self, _state: &PartialState) {}

    /// Called when a popped state's simulator run reports every train has
    /// exited — the search is about to return it as the winner.
    fn on_goal(&mut self, _state: &PartialState) {}

    /// Called once the wall-clock deadline passes, before `solve` returns.
    fn on_timeout(&mut self) {}

    /// Called when a candidate successor is discarded — either its
    /// simulator run was infeasible, or its heuristic was infinite.
    fn on_prune(&mut self, _state: &PartialState) {}
}

/// A [`SolverObserver`] that does nothing. Use when you need
/// `solve_with_observer`'s hooks but don't want progress callbacks.
pub struct NoopSolverObserver;

impl SolverObserver for NoopSolverObserver {}
