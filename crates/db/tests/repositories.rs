//! Integration tests for the repository layer against a real database:
//! - Course/section/lab-group creation and unique constraints
//! - Schedule time configuration round trip and re-derivation on update
//! - Atomic assignment replacement and rollback on unknown IDs
//! - Solve token acquisition, release and takeover
//! - Solver run audit trail
//! - Domain snapshot loading

use std::time::Duration;

use sqlx::PgPool;
use timetable_core::calendar::Weekday;
use timetable_core::catalog::{CourseKind, FacultyKind, RoomKind};
use timetable_core::payload::build_payload;
use timetable_core::scheduling::{run_status, schedule_status};
use timetable_core::solve_result::ProposedAssignment;
use timetable_core::time_config::TimeConfig;
use timetable_db::models::assignment::AssignmentFilter;
use timetable_db::models::batch::CreateBatch;
use timetable_db::models::course::{CourseWithSections, CreateCourse};
use timetable_db::models::faculty::{CreateFaculty, UpdateFaculty};
use timetable_db::models::room::CreateRoom;
use timetable_db::models::schedule::{CreateSchedule, UpdateSchedule};
use timetable_db::models::solver_run::FinishSolverRun;
use timetable_db::repositories::{
    AssignmentRepo, BatchRepo, CourseRepo, FacultyRepo, RoomRepo, ScheduleRepo, SnapshotRepo,
    SolverRunRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Seed {
    schedule_id: i64,
    lecture: CourseWithSections,
    lab: CourseWithSections,
    faculty_id: i64,
    room_id: i64,
    batch_id: i64,
}

async fn seed(pool: &PgPool) -> Seed {
    let lecture = CourseRepo::create(
        pool,
        &CreateCourse {
            code: "CS101".into(),
            name: "Programming".into(),
            kind: CourseKind::Lecture,
            hours_per_week: 3,
            sessions_per_week: 3,
            sections: vec!["A".into()],
            lab_groups_per_section: None,
        },
    )
    .await
    .unwrap();
    let lab = CourseRepo::create(
        pool,
        &CreateCourse {
            code: "CS101L".into(),
            name: "Programming Lab".into(),
            kind: CourseKind::Lab,
            hours_per_week: 2,
            sessions_per_week: 1,
            sections: vec!["A".into()],
            lab_groups_per_section: Some(2),
        },
    )
    .await
    .unwrap();
    let faculty = FacultyRepo::create(
        pool,
        &CreateFaculty {
            name: "Ada".into(),
            email: "ada@example.edu".into(),
            kind: FacultyKind::Fulltime,
            max_hours: 18,
            availability: None,
            course_ids: vec![lecture.course.id, lab.course.id],
        },
    )
    .await
    .unwrap();
    let room = RoomRepo::create(
        pool,
        &CreateRoom {
            name: "R101".into(),
            kind: RoomKind::Lecture,
            capacity: 60,
            availability: None,
        },
    )
    .await
    .unwrap();
    let batch = BatchRepo::create(
        pool,
        &CreateBatch {
            name: "CSE-1".into(),
            student_count: 55,
            section_ids: vec![lecture.sections[0].section.id, lab.sections[0].section.id],
        },
    )
    .await
    .unwrap();
    let schedule = ScheduleRepo::create(
        pool,
        &CreateSchedule {
            name: "Fall timetable".into(),
            semester: "2025-FALL".into(),
            time_config: TimeConfig::standard(),
        },
    )
    .await
    .unwrap();

    Seed {
        schedule_id: schedule.id,
        lecture,
        lab,
        faculty_id: faculty.faculty.id,
        room_id: room.id,
        batch_id: batch.batch.id,
    }
}

fn proposal(seed: &Seed, day: Weekday, slot_index: u32) -> ProposedAssignment {
    ProposedAssignment {
        section_id: seed.lecture.sections[0].section.id,
        lab_group_id: None,
        faculty_id: seed.faculty_id,
        room_id: seed.room_id,
        batch_id: seed.batch_id,
        day,
        slot_index,
        duration: 1,
        course_code: "CS101".into(),
        course_name: "Programming".into(),
        start_time: "09:00".parse().unwrap(),
        end_time: "10:00".parse().unwrap(),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_course_created_with_lab_groups(pool: PgPool) {
    let seed = seed(&pool).await;
    assert_eq!(seed.lab.course.course_type, "LAB");
    let groups: Vec<_> = seed.lab.sections[0]
        .lab_groups
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(groups, vec!["G1", "G2"]);
    assert!(seed.lecture.sections[0].lab_groups.is_empty());

    let listed = CourseRepo::list_with_sections(&pool).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].sections[0].lab_groups.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_course_code_is_unique_violation(pool: PgPool) {
    seed(&pool).await;
    let err = CourseRepo::create(
        &pool,
        &CreateCourse {
            code: "CS101".into(),
            name: "Again".into(),
            kind: CourseKind::Lecture,
            hours_per_week: 1,
            sessions_per_week: 1,
            sections: vec![],
            lab_groups_per_section: None,
        },
    )
    .await
    .unwrap_err();
    assert!(is_unique_violation(&err));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_faculty_defaults_and_qualification_replace(pool: PgPool) {
    let seed = seed(&pool).await;
    let faculty = FacultyRepo::find_with_courses(&pool, seed.faculty_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(faculty.faculty.availability.0.count(), 35);
    assert_eq!(faculty.course_ids.len(), 2);

    let updated = FacultyRepo::update(
        &pool,
        seed.faculty_id,
        &UpdateFaculty {
            name: None,
            email: None,
            kind: None,
            max_hours: Some(10),
            availability: None,
            course_ids: Some(vec![seed.lab.course.id]),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.faculty.max_hours, 10);
    assert_eq!(updated.course_ids, vec![seed.lab.course.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_section_lookup_keeps_request_order(pool: PgPool) {
    let seed = seed(&pool).await;
    let lab_section = seed.lab.sections[0].section.id;
    let lecture_section = seed.lecture.sections[0].section.id;
    let rows = CourseRepo::sections_with_courses(&pool, &[lab_section, 999_999, lecture_section])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].course_code, "CS101L");
    assert_eq!(rows[1].section_id, lecture_section);
}

// ---------------------------------------------------------------------------
// Schedules and time configuration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_config_round_trip(pool: PgPool) {
    let seed = seed(&pool).await;
    let schedule = ScheduleRepo::find_by_id(&pool, seed.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule.status_id, schedule_status::DRAFT);
    let tc = ScheduleRepo::find_time_config(&pool, seed.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tc, TimeConfig::standard());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_config_update_rederives_assignment_times(pool: PgPool) {
    let seed = seed(&pool).await;
    AssignmentRepo::replace_for_schedule(
        &pool,
        seed.schedule_id,
        &[proposal(&seed, Weekday::Mon, 0), proposal(&seed, Weekday::Mon, 6)],
    )
    .await
    .unwrap();

    // 08:00-12:00 / 13:00-16:00 in 60-minute slots: 7 slots, first at 08:00.
    let mut tc = TimeConfig::standard();
    tc.start_time = "08:00".parse().unwrap();
    tc.end_time = "16:00".parse().unwrap();
    ScheduleRepo::update(
        &pool,
        seed.schedule_id,
        &UpdateSchedule {
            name: None,
            semester: None,
            status_id: None,
            time_config: Some(tc),
        },
    )
    .await
    .unwrap()
    .unwrap();

    let rows = AssignmentRepo::list_for_schedule(&pool, seed.schedule_id, &AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(rows[0].start_time, "08:00");
    assert_eq!(rows[0].end_time, "09:00");
    assert_eq!(rows[1].start_time, "15:00");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_solve_token_is_exclusive(pool: PgPool) {
    let seed = seed(&pool).await;
    let hour = Duration::from_secs(3600);

    let token = ScheduleRepo::try_begin_solve(&pool, seed.schedule_id, hour)
        .await
        .unwrap()
        .expect("first acquire succeeds");
    assert!(ScheduleRepo::try_begin_solve(&pool, seed.schedule_id, hour)
        .await
        .unwrap()
        .is_none());

    assert!(ScheduleRepo::end_solve(&pool, seed.schedule_id, token).await.unwrap());
    assert!(ScheduleRepo::try_begin_solve(&pool, seed.schedule_id, hour)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_solve_token_is_taken_over(pool: PgPool) {
    let seed = seed(&pool).await;
    let old = ScheduleRepo::try_begin_solve(&pool, seed.schedule_id, Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    let new = ScheduleRepo::try_begin_solve(&pool, seed.schedule_id, Duration::ZERO)
        .await
        .unwrap()
        .unwrap();
    assert!(new > old);

    // The previous holder can no longer release the token.
    assert!(!ScheduleRepo::end_solve(&pool, seed.schedule_id, old).await.unwrap());
    assert!(ScheduleRepo::end_solve(&pool, seed.schedule_id, new).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_solve_token_on_missing_schedule(pool: PgPool) {
    let token = ScheduleRepo::try_begin_solve(&pool, 424_242, Duration::from_secs(60))
        .await
        .unwrap();
    assert!(token.is_none());
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_is_idempotent_and_sets_solved(pool: PgPool) {
    let seed = seed(&pool).await;
    let result = vec![
        proposal(&seed, Weekday::Tue, 1),
        proposal(&seed, Weekday::Mon, 2),
    ];

    for _ in 0..2 {
        let inserted = AssignmentRepo::replace_for_schedule(&pool, seed.schedule_id, &result)
            .await
            .unwrap();
        assert_eq!(inserted, 2);
    }

    assert_eq!(
        AssignmentRepo::count_for_schedule(&pool, seed.schedule_id)
            .await
            .unwrap(),
        2
    );
    let schedule = ScheduleRepo::find_by_id(&pool, seed.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule.status_id, schedule_status::SOLVED);

    let rows = AssignmentRepo::list_for_schedule(&pool, seed.schedule_id, &AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(rows[0].day, "MON");
    assert_eq!(rows[1].day, "TUE");
    assert_eq!(rows[0].faculty_name, "Ada");
    assert_eq!(rows[0].batch_name, "CSE-1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_with_unknown_id_rolls_back(pool: PgPool) {
    let seed = seed(&pool).await;
    AssignmentRepo::replace_for_schedule(&pool, seed.schedule_id, &[proposal(&seed, Weekday::Mon, 0)])
        .await
        .unwrap();
    ScheduleRepo::set_status(&pool, seed.schedule_id, schedule_status::FINALIZED)
        .await
        .unwrap();

    let mut bad = proposal(&seed, Weekday::Wed, 3);
    bad.room_id = 999_999;
    let err = AssignmentRepo::replace_for_schedule(
        &pool,
        seed.schedule_id,
        &[proposal(&seed, Weekday::Tue, 0), bad],
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503")));

    let rows = AssignmentRepo::list_for_schedule(&pool, seed.schedule_id, &AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].day, "MON");
    let schedule = ScheduleRepo::find_by_id(&pool, seed.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule.status_id, schedule_status::FINALIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_filter_by_room(pool: PgPool) {
    let seed = seed(&pool).await;
    AssignmentRepo::replace_for_schedule(&pool, seed.schedule_id, &[proposal(&seed, Weekday::Mon, 0)])
        .await
        .unwrap();

    let filter = AssignmentFilter {
        room_id: Some(seed.room_id),
        ..Default::default()
    };
    let hits = AssignmentRepo::list_for_schedule(&pool, seed.schedule_id, &filter)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let filter = AssignmentFilter {
        room_id: Some(seed.room_id + 1),
        ..Default::default()
    };
    let misses = AssignmentRepo::list_for_schedule(&pool, seed.schedule_id, &filter)
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_referenced_entities_cannot_be_deleted(pool: PgPool) {
    let seed = seed(&pool).await;
    AssignmentRepo::replace_for_schedule(&pool, seed.schedule_id, &[proposal(&seed, Weekday::Mon, 0)])
        .await
        .unwrap();

    let is_fk_violation = |err: &sqlx::Error| {
        matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
    };
    let err = FacultyRepo::delete(&pool, seed.faculty_id).await.unwrap_err();
    assert!(is_fk_violation(&err));
    let err = RoomRepo::delete(&pool, seed.room_id).await.unwrap_err();
    assert!(is_fk_violation(&err));
    let err = BatchRepo::delete(&pool, seed.batch_id).await.unwrap_err();
    assert!(is_fk_violation(&err));
    let err = CourseRepo::delete(&pool, seed.lecture.course.id).await.unwrap_err();
    assert!(is_fk_violation(&err));
    assert_eq!(
        AssignmentRepo::count_for_schedule(&pool, seed.schedule_id)
            .await
            .unwrap(),
        1
    );

    // Deleting the schedule itself still takes its assignments with it.
    assert!(ScheduleRepo::delete(&pool, seed.schedule_id).await.unwrap());
    assert!(FacultyRepo::delete(&pool, seed.faculty_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Solver runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_solver_run_finishes_once(pool: PgPool) {
    let seed = seed(&pool).await;
    let run = SolverRunRepo::create_running(&pool, seed.schedule_id)
        .await
        .unwrap();
    assert_eq!(run.status_id, run_status::RUNNING);
    assert!(run.finished_at.is_none());

    let finish = FinishSolverRun {
        status_id: run_status::FAILED,
        solve_time_ms: None,
        total_score: None,
        assignment_count: None,
        diagnostics: Some(serde_json::json!({"error": "solver unreachable"})),
    };
    let done = SolverRunRepo::finish(&pool, run.id, &finish)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status_id, run_status::FAILED);
    assert!(done.finished_at.is_some());
    assert!(SolverRunRepo::finish(&pool, run.id, &finish)
        .await
        .unwrap()
        .is_none());

    let second = SolverRunRepo::create_running(&pool, seed.schedule_id)
        .await
        .unwrap();
    let runs = SolverRunRepo::list_for_schedule(&pool, seed.schedule_id, None)
        .await
        .unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, second.id);
    let latest = SolverRunRepo::list_for_schedule(&pool, seed.schedule_id, Some(1))
        .await
        .unwrap();
    assert_eq!(latest.len(), 1);
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_builds_payload(pool: PgPool) {
    let seed = seed(&pool).await;
    let snapshot = SnapshotRepo::load(&pool, seed.schedule_id)
        .await
        .unwrap()
        .unwrap();
    let payload = build_payload(snapshot).unwrap();

    assert_eq!(payload.schedule_id, seed.schedule_id);
    assert_eq!(payload.courses.len(), 2);
    let lab = payload.courses.iter().find(|c| c.kind == CourseKind::Lab).unwrap();
    assert_eq!(lab.sections[0].lab_groups.len(), 2);
    assert_eq!(payload.faculty[0].qualified_course_ids.len(), 2);
    assert_eq!(payload.batches[0].section_ids.len(), 2);
    assert_eq!(payload.rooms[0].availability.day(Weekday::Fri).len(), 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_of_missing_schedule_is_none(pool: PgPool) {
    assert!(SnapshotRepo::load(&pool, 1).await.unwrap().is_none());
}
