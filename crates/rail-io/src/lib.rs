//! `rail-io` — the on-disk boundary of the workspace: reading a network +
//! timetable directory into an [`rail_instance::Instance`], and writing a
//! solver result back out as a `solution/` directory.
//!
//! No other crate in the workspace performs file I/O; simulation and search
//! are pure functions of in-memory values.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rail_io::{load_instance, write_solution};
//!
//! let instance = load_instance(Path::new("./scenario"))?;
//! let result = solver.solve(&instance, &options, deadline)?;
//! write_solution(
//!     Path::new("./scenario"),
//!     &instance.network,
//!     &result.solution.unwrap(),
//!     result.status,
//!     result.objective,
//!     options.dt,
//! )?;
//! ```

pub mod error;
pub mod loader;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::{IoError, IoResult};
pub use loader::load_instance;
pub use writer::write_solution;
