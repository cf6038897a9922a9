use thiserror::Error;

use rail_core::{RailError, StationId, TrainId};

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("train {train}: entry/exit vertex must have exactly one directed neighbor in the required direction")]
    BadEntryExitVertex { train: TrainId },

    #[error("train {train}: station edge for stop {station} does not exist in the network")]
    UnknownStationEdge { train: TrainId, station: StationId },

    #[error("train {train}: stop ranges are not pairwise conflict-free")]
    ConflictingStops { train: TrainId },

    #[error("train {train}: minimum-length route does not fit inside the schedule window, even with slack")]
    WindowTooTight { train: TrainId },

    #[error(transparent)]
    Core(#[from] RailError),
}

pub type TimetableResult<T> = Result<T, TimetableError>;
