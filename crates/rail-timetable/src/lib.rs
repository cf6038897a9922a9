//! `rail-timetable` — train, stop, schedule, and station types, and the
//! consistency check that verifies a timetable against a network.
//!
//! On-disk loading lives in `rail-io`, which owns every external interface
//! the workspace exposes (spec.md §6); this crate only knows about
//! in-memory values.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                |
//! |-----------|-----------------------------------------------------------|
//! | [`types`] | `Train`, `Stop`, `Schedule`, `Station`, `Timetable`        |
//! | [`error`] | `TimetableError`, `TimetableResult<T>`                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|---------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod types;


pub use error::{TimetableError, TimetableResult};
pub use types::{Schedule, Station, Stop, Timetable, Train, WINDOW_SLACK_SECS};
