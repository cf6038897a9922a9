//! `rail-network` — railway track graph, successor relation, shortest paths,
//! reverse-edge lookup, and TTD sectioning.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|----------------------------------------------------------|
//! | [`network`] | `RailNetwork` (CSR), `RailNetworkBuilder`, `Path`, `TtdSection` |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|---------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod network;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use network::{Edge, Path, RailNetwork, RailNetworkBuilder, TtdSection, Vertex, VertexKind};
