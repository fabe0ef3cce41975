//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod batch_repo;
pub mod course_repo;
pub mod faculty_repo;
pub mod room_repo;
pub mod schedule_repo;
pub mod snapshot_repo;
pub mod solver_run_repo;

pub use assignment_repo::AssignmentRepo;
pub use batch_repo::BatchRepo;
pub use course_repo::CourseRepo;
pub use faculty_repo::FacultyRepo;
pub use room_repo::RoomRepo;
pub use schedule_repo::ScheduleRepo;
pub use snapshot_repo::SnapshotRepo;
pub use solver_run_repo::SolverRunRepo;
