//! Schedule and solver-run lifecycle state machines.
//!
//! Status IDs match the `schedule_statuses` and `solver_run_statuses` seed
//! data (1-based SMALLSERIAL). The `db` crate mirrors them as enums; the
//! numbers are repeated here because `core` has no internal deps.

// ---------------------------------------------------------------------------
// Schedule lifecycle
// ---------------------------------------------------------------------------

pub mod schedule_status {
    pub const DRAFT: i16 = 1;
    pub const SOLVED: i16 = 2;
    pub const FINALIZED: i16 = 3;

    /// Returns the set of status IDs reachable from `from_status`.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Draft -> Solved (only via a successful solve)
            DRAFT => &[SOLVED],
            // Solved -> Solved (re-solve), Finalized
            SOLVED => &[SOLVED, FINALIZED],
            // Finalized -> Draft (reopen)
            FINALIZED => &[DRAFT],
            _ => &[],
        }
    }

    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning a descriptive message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid schedule transition: {} ({from}) -> {} ({to})",
                status_name(from),
                status_name(to)
            ))
        }
    }

    /// Whether a solve may start from this status.
    pub fn is_solvable(status: i16) -> bool {
        can_transition(status, SOLVED)
    }

    pub fn status_name(id: i16) -> &'static str {
        match id {
            DRAFT => "Draft",
            SOLVED => "Solved",
            FINALIZED => "Finalized",
            _ => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Solver run lifecycle
// ---------------------------------------------------------------------------

pub mod run_status {
    pub const RUNNING: i16 = 1;
    pub const SUCCESS: i16 = 2;
    pub const INFEASIBLE: i16 = 3;
    pub const FAILED: i16 = 4;

    /// A run is created Running and finished exactly once.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            RUNNING => &[SUCCESS, INFEASIBLE, FAILED],
            // Terminal
            SUCCESS | INFEASIBLE | FAILED => &[],
            _ => &[],
        }
    }

    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    pub fn is_terminal(status: i16) -> bool {
        matches!(status, SUCCESS | INFEASIBLE | FAILED)
    }

    pub fn status_name(id: i16) -> &'static str {
        match id {
            RUNNING => "Running",
            SUCCESS => "Success",
            INFEASIBLE => "Infeasible",
            FAILED => "Failed",
            _ => "Unknown",
        }
    }
}
