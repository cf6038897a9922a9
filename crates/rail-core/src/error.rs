//! Cross-cutting error taxonomy.
//!
//! Every crate above `rail-core` defines its own `thiserror`-derived error
//! enum and wraps `RailError` in a variant (or via `#[from]`) rather than
//! re-exporting it, so a caller several layers up can still match on the
//! root cause without depending on intermediate crates' error types.

use thiserror::Error;

use crate::ids::TrainId;

/// The root error kind shared by every crate in this workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RailError {
    /// An argument violates a documented precondition: negative time,
    /// unknown train/edge, an out-of-range index, a speed above `vmax + EPS`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Loaded data violates a network/timetable structural invariant.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// The simulator rejected a state while advancing `train`.
    #[error("infeasible schedule for train {train}: {cause}")]
    InfeasibleSchedule { train: TrainId, cause: String },

    /// The simulator detected a no-progress fixed point.
    #[error("deadlock: no train can advance")]
    Deadlock,

    /// The solver's deadline passed before a solution (or proof of
    /// infeasibility) was found.
    #[error("timeout")]
    Timeout,

    /// A lookup for an absent train/edge/vertex/station.
    #[error("{kind} {key} does not exist")]
    NotExistent { kind: &'static str, key: String },
}

/// Shorthand result type for `rail-core` and, by convention, every crate
/// that has no need for a richer error enum of its own.
pub type CoreResult<T> = Result<T, RailError>;
