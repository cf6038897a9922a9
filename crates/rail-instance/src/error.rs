use thiserror::Error;

use rail_core::{RailError, TrainId};
use rail_network::NetworkError;
use rail_timetable::TimetableError;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("timetable is inconsistent with the network: {0}")]
    Timetable(#[from] TimetableError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("train {0}: no station edges admit a stop of the train's length")]
    NoPossibleStop(TrainId),

    #[error(transparent)]
    Core(#[from] RailError),
}

pub type InstanceResult<T> = Result<T, InstanceError>;
