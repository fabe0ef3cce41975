//! Pure timetabling domain logic: time grid derivation, availability,
//! the solver wire contract, payload building, and grid reconstruction.
//!
//! Nothing in this crate performs I/O. The `db`, `solver`, `pipeline` and
//! `api` crates build on these types.

pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod grid;
pub mod payload;
pub mod preflight;
pub mod scheduling;
pub mod solve_result;
pub mod time_config;
pub mod time_grid;
pub mod types;
