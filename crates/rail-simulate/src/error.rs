use rail_core::{EdgeId, RailError, TrainId, TtdId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("train {train}: infeasible schedule ({cause})")]
    InfeasibleSchedule { train: TrainId, cause: String },

    #[error("deadlock: no train can advance")]
    Deadlock,

    #[error("train {train}: overspeed on edge {edge}")]
    Overspeed { train: TrainId, edge: EdgeId },

    #[error("capacity violation in TTD section {ttd}")]
    CapacityViolation { ttd: TtdId },

    #[error(transparent)]
    Core(#[from] RailError),
}

pub type SimulateResult<T> = Result<T, SimulateError>;
