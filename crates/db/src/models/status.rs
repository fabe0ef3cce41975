//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table, and the constants in
//! `timetable_core::scheduling`.

use timetable_core::scheduling::{run_status, schedule_status};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( x if x == $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Schedule lifecycle status.
    ScheduleStatus {
        Draft = schedule_status::DRAFT,
        Solved = schedule_status::SOLVED,
        Finalized = schedule_status::FINALIZED,
    }
}

define_status_enum! {
    /// Solver run outcome.
    SolverRunStatus {
        Running = run_status::RUNNING,
        Success = run_status::SUCCESS,
        Infeasible = run_status::INFEASIBLE,
        Failed = run_status::FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_order() {
        assert_eq!(ScheduleStatus::Draft.id(), 1);
        assert_eq!(ScheduleStatus::Finalized.id(), 3);
        assert_eq!(SolverRunStatus::Running.id(), 1);
        assert_eq!(SolverRunStatus::Failed.id(), 4);
    }

    #[test]
    fn from_id_round_trips() {
        assert_eq!(ScheduleStatus::from_id(2), Some(ScheduleStatus::Solved));
        assert_eq!(SolverRunStatus::from_id(3), Some(SolverRunStatus::Infeasible));
        assert_eq!(ScheduleStatus::from_id(9), None);
    }
}
