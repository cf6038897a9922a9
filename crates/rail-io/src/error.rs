//! Error types for `rail-io`.

use thiserror::Error;

use rail_core::RailError;
use rail_instance::InstanceError;
use rail_network::NetworkError;

/// Errors that can occur while loading an instance or writing a solution.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GraphML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("malformed edge key {0:?}: expected \"('src','tgt')\"")]
    BadEdgeKey(String),

    #[error("unknown vertex kind {0:?}")]
    UnknownVertexKind(String),

    #[error("{file}: unknown train {train:?}")]
    UnknownTrain { file: &'static str, train: String },

    #[error("{file}: unknown station {station:?}")]
    UnknownStation { file: &'static str, station: String },

    #[error("routes.json references edge {0:?}->{1:?}, which does not exist in the network")]
    UnknownRouteEdge(String, String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Core(#[from] RailError),
}

pub type IoResult<T> = Result<T, IoError>;
