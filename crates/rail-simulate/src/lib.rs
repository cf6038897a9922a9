//! `rail-simulate` — `GreedySimulator`, the fixed-`dt` stepping engine that
//! scores a `PartialState` by playing every train's committed route forward
//! under moving-block signalling.
//!
//! # Crate layout
//!
//! | Module     | Contents                                          |
//! |------------|----------------------------------------------------|
//! | [`engine`]   | `GreedySimulator` and its private free functions  |
//! | [`state`]    | `SimulatorOptions`, `SimulationOutcome`           |
//! | [`observer`] | `SimulatorObserver`, `NoopSimulatorObserver`      |
//! | [`error`]    | `SimulateError`, `SimulateResult<T>`              |
//!
//! # Movement model
//!
//! `GreedySimulator::simulate` advances every train by a fixed `dt` each
//! step. A train's movement authority is the minimum of the distance
//! remaining in its committed route, the distance to its next committed
//! stop, and the distance to the nearest upcoming edge currently occupied by
//! a conflicting train. `rail-core::kinematics` turns that authority and the
//! train's acceleration profile into a position/speed update with no
//! iteration inside a step. The loop ends when every train has exited, when
//! no train can advance while at least one genuinely blocks on another
//! (`Deadlock`), or when a schedule window is missed with its lateness flag
//! unset (`InfeasibleSchedule`).

pub mod engine;
pub mod error;
pub mod observer;
pub mod state;


pub use engine::GreedySimulator;
pub use error::{SimulateError, SimulateResult};
pub use observer::{NoopSimulatorObserver, SimulatorObserver};
pub use state::{BrakingWindow, SimulationOutcome, SimulatorOptions};
