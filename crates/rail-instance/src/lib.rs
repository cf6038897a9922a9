//! `rail-instance` — composes a [`rail_network::RailNetwork`] and a
//! [`rail_timetable::Timetable`] into a validated, read-only `Instance` with
//! eagerly-derived lookup tables used by the simulator and solver.
//!
//! # Crate layout
//!
//! | Module       | Contents                                          |
//! |--------------|----------------------------------------------------|
//! | [`instance`] | `Instance`, `OverlapKind`                           |
//! | [`error`]    | `InstanceError`, `InstanceResult<T>`                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|---------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod instance;


pub use error::{InstanceError, InstanceResult};
pub use instance::{Instance, OverlapKind};
