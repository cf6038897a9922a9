//! Per-run configuration and outputs for [`crate::GreedySimulator`].

use rail_core::SimTimeConfig;

/// Tuning knobs for one `simulate()` call.
///
/// The three lateness flags are kept independent (mirroring the original
/// implementation's call sites) rather than folded into a single "late OK"
/// switch. When a flag is set, the corresponding overrun is accepted and
/// turned into a credited delay on the objective instead of failing the run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatorOptions {
    pub time: SimTimeConfig,
    pub late_entry_possible: bool,
    pub late_exit_possible: bool,
    pub late_stop_possible: bool,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            time: SimTimeConfig::default(),
            late_entry_possible: false,
            late_exit_possible: false,
            late_stop_possible: false,
        }
    }
}

/// `(start_brake_time, start_brake_position)` for a train that braked to a
/// full stop en route. `None` if the train never braked to zero.
pub type BrakingWindow = Option<(f64, f64)>;

/// Everything `GreedySimulator::simulate` produces on success.
#[derive(Clone, Debug, Default)]
pub struct SimulationOutcome {
    /// Per-train exit time, indexed by `TrainId`. `None` if the train had not
    /// exited when the step loop terminated (a non-terminal `PartialState`).
    pub exit_time: Vec<Option<f64>>,

    /// Per-train braking window, indexed by `TrainId`.
    pub braking_window: Vec<BrakingWindow>,

    /// Per-vertex latest headway release time, indexed by `VertexId`.
    pub vertex_free_time: Vec<f64>,

    /// Per-train credited delay (seconds) accumulated from accepted lateness
    /// overruns — the quantity `rail-solve` sums into `g(S)`.
    pub delay: Vec<f64>,

    /// Per-train front position at the moment the step loop stopped —
    /// final for an exited train, last-known for one still en route. Feeds
    /// `rail-solve`'s `Simple` heuristic, which needs a train's current
    /// position to estimate remaining travel time.
    pub final_front: Vec<f64>,

    /// Per-train speed at the moment the step loop stopped, paired with
    /// `final_front`.
    pub final_v: Vec<f64>,
}
