//! Simulation time step and floating-point tolerance constants.
//!
//! # Design
//!
//! Time in this system is a plain `f64` number of seconds since the start of
//! service — there is no tick/wall-clock mapping layer, since the simulator
//! and solver reason about continuous kinematics rather than discrete
//! calendar events. `SimTimeConfig` is the single small, `Clone` struct
//! threaded by reference from the caller down through `rail-instance`,
//! `rail-simulate`, and `rail-solve`, playing the role a top-level
//! configuration struct plays in the framework this crate is built from.

use std::fmt;

/// Absolute tolerance for floating-point precondition checks (a speed
/// exceeding `vmax + EPS`, a `dt` of `-EPS`, …).
pub const EPS: f64 = 1e-6;

/// Tolerance governing edge-boundary speed comparisons during simulation —
/// distinct from [`EPS`] because it must absorb one kinematic step's worth
/// of discretization error, not just floating-point noise.
pub const LINE_SPEED_ACCURACY: f64 = 1e-3;

/// Tolerance for comparing a sampled position against an expected kinematic
/// trajectory: `ε_kin = KINEMATIC_POSITION_TOLERANCE_FACTOR · route length`.
pub const KINEMATIC_POSITION_TOLERANCE_FACTOR: f64 = 1e-3;

/// Simulation-wide timing and tolerance configuration.
///
/// Constructed once by the caller and passed by reference to
/// `rail_simulate::GreedySimulator` and `rail_solve::AStarSolver`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTimeConfig {
    /// Fixed simulation step, in seconds. The source implementation
    /// hard-codes 6; this keeps it configurable per instance.
    pub dt: f64,

    /// Minimum nonzero line speed (m/s). Lifted from a hard-coded constant
    /// in the source implementation to a configurable instance-wide
    /// parameter, since its original provenance was ambiguous.
    pub v_min: f64,
}

impl SimTimeConfig {
    /// The step duration and minimum line speed used throughout this
    /// crate's own tests and the end-to-end fixtures in `rail-simulate`.
    pub const DEFAULT_DT: f64 = 6.0;
    pub const DEFAULT_V_MIN: f64 = 1.0;

    pub fn new(dt: f64, v_min: f64) -> Self {
        Self { dt, v_min }
    }
}

impl Default for SimTimeConfig {
    fn default() -> Self {
        Self {
            dt: Self::DEFAULT_DT,
            v_min: Self::DEFAULT_V_MIN,
        }
    }
}

impl fmt::Display for SimTimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dt={}s v_min={}m/s", self.dt, self.v_min)
    }
}
