//! `rail-state` — [`PartialState`], the solver's persistent-update value
//! type over committed train routes, section/vertex pass orders, and stop
//! positions.
//!
//! # Crate layout
//!
//! | Module    | Contents                      |
//! |-----------|--------------------------------|
//! | [`state`] | `PartialState`                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `PartialState`.  |

pub mod state;

#[cfg(test)]
mod tests;

pub use state::PartialState;
