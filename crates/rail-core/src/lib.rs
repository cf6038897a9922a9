//! `rail-core` — foundational types for the train-routing core.
//!
//! This crate is a dependency of every other crate in the workspace. It
//! intentionally has no dependency on its siblings and a minimal external
//! one (only `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                           |
//! |----------------|------------------------------------------------------|
//! | [`ids`]        | `VertexId`, `EdgeId`, `TrainId`, `StationId`, `TtdId` |
//! | [`config`]     | `SimTimeConfig`, `EPS`, `LINE_SPEED_ACCURACY`         |
//! | [`kinematics`] | Pure closed-form motion kernel (§4.1)                 |
//! | [`error`]      | `RailError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|-------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.    |
//!           | Required by `rail-io`.                                 |

pub mod config;
pub mod error;
pub mod ids;
pub mod kinematics;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{SimTimeConfig, EPS, KINEMATIC_POSITION_TOLERANCE_FACTOR, LINE_SPEED_ACCURACY};
pub use error::{CoreResult, RailError};
pub use ids::{EdgeId, StationId, TrainId, TtdId, VertexId};
