//! Solve orchestration: snapshot the schedule, call the solver, apply the
//! result atomically, and keep the solver run audit trail.

pub mod error;
pub mod orchestrator;
pub mod store;

pub use error::SolveError;
pub use orchestrator::{SolveOrchestrator, SolveOutcome};
pub use store::{PgSolveStore, SolveLock, SolveStore};
