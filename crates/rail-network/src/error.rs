//! Network-subsystem error type.

use thiserror::Error;

use rail_core::{EdgeId, RailError, VertexId};

/// Errors produced while building or querying a [`crate::RailNetwork`].
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from edge {from} to vertex {to}")]
    NoRoute { from: EdgeId, to: VertexId },

    #[error("vertex {0} not found in network")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error(transparent)]
    InvalidGraph(#[from] RailError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
