//! Row types and DTOs, one module per table family.

pub mod assignment;
pub mod batch;
pub mod course;
pub mod faculty;
pub mod room;
pub mod schedule;
pub mod solver_run;
pub mod status;
