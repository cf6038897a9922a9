use thiserror::Error;

use rail_core::RailError;
use rail_instance::InstanceError;
use rail_network::NetworkError;
use rail_simulate::SimulateError;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Simulate(#[from] SimulateError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Core(#[from] RailError),
}

pub type SolveResult<T> = Result<T, SolveError>;
