//! Per-step progress hook for [`crate::GreedySimulator`].
//!
//! Mirrors the source framework's `SimObserver` (no-op defaults, called at
//! fixed points in the step loop) so applications that want per-step
//! telemetry — a progress bar, a trajectory recorder — implement this trait
//! instead of the engine growing output concerns of its own.

use rail_core::TrainId;

/// Callbacks invoked by [`crate::GreedySimulator::simulate_with_observer`] at
/// each `dt` step boundary.
pub trait SimulatorObserver {
    /// Called once per step, after movement and dwell have been applied,
    /// with every train's current front position and speed.
    fn on_step(&mut self, _tau: f64, _front: &[f64], _v: &[f64]) {}

    /// Called when `train` transitions to `Exited`.
    fn on_exit(&mut self, _train: TrainId, _tau: f64) {}
}

/// A [`SimulatorObserver`] that does nothing.
pub struct NoopSimulatorObserver;

impl SimulatorObserver for NoopSimulatorObserver {}
