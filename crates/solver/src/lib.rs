//! Solver Gateway: the seam between the timetable service and the
//! external constraint solver.
//!
//! [`SolverGateway`] is what the solve pipeline depends on;
//! [`SolverClient`] is the HTTP implementation used in production.

pub mod client;
pub mod gateway;

pub use client::SolverClient;
pub use gateway::{SolverError, SolverGateway};
