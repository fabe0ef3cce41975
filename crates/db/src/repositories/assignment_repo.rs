//! Repository for the `assignments` table.

use sqlx::PgPool;
use timetable_core::calendar::Weekday;
use timetable_core::scheduling::schedule_status;
use timetable_core::solve_result::ProposedAssignment;
use timetable_core::time_config::TimeConfig;
use timetable_core::time_grid::SlotGrid;
use timetable_core::types::DbId;

use crate::models::assignment::{AssignmentFilter, AssignmentWithNames};

/// Assignment columns joined with display names. Expects aliases
/// `a`, `f`, `r` and `b`.
const JOINED_COLUMNS: &str = "a.id, a.schedule_id, a.section_id, a.lab_group_id, a.faculty_id, \
    a.room_id, a.batch_id, a.day, a.slot_index, a.duration, a.course_code, a.course_name, \
    a.start_time, a.end_time, a.created_at, \
    f.name AS faculty_name, r.name AS room_name, b.name AS batch_name";

/// Provides read access to assignments and the atomic replace used when
/// a solver result is applied.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// List a schedule's assignments, optionally filtered by batch,
    /// faculty or room, ordered by weekday then slot index.
    pub async fn list_for_schedule(
        pool: &PgPool,
        schedule_id: DbId,
        filter: &AssignmentFilter,
    ) -> Result<Vec<AssignmentWithNames>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM assignments a
             JOIN faculty f ON f.id = a.faculty_id
             JOIN rooms r ON r.id = a.room_id
             JOIN batches b ON b.id = a.batch_id
             WHERE a.schedule_id = $1
               AND ($2::BIGINT IS NULL OR a.batch_id = $2)
               AND ($3::BIGINT IS NULL OR a.faculty_id = $3)
               AND ($4::BIGINT IS NULL OR a.room_id = $4)
             ORDER BY array_position($5::TEXT[], a.day), a.slot_index, a.id"
        );
        sqlx::query_as::<_, AssignmentWithNames>(&query)
            .bind(schedule_id)
            .bind(filter.batch_id)
            .bind(filter.faculty_id)
            .bind(filter.room_id)
            .bind(week_order())
            .fetch_all(pool)
            .await
    }

    /// Number of assignments stored for a schedule.
    pub async fn count_for_schedule(pool: &PgPool, schedule_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(pool)
            .await
    }

    /// Replace every assignment of a schedule and mark it Solved, in one
    /// transaction.
    ///
    /// Any failure (a foreign key violation from an unknown ID, say)
    /// rolls back the whole replacement, leaving the previous assignments
    /// and status in place. Returns the number of rows inserted.
    pub async fn replace_for_schedule(
        pool: &PgPool,
        schedule_id: DbId,
        assignments: &[ProposedAssignment],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM assignments WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for a in assignments {
            let result = sqlx::query(
                "INSERT INTO assignments
                    (schedule_id, section_id, lab_group_id, faculty_id, room_id, batch_id,
                     day, slot_index, duration, course_code, course_name, start_time, end_time)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(schedule_id)
            .bind(a.section_id)
            .bind(a.lab_group_id)
            .bind(a.faculty_id)
            .bind(a.room_id)
            .bind(a.batch_id)
            .bind(a.day.as_str())
            .bind(to_i32(a.slot_index)?)
            .bind(to_i32(a.duration)?)
            .bind(&a.course_code)
            .bind(&a.course_name)
            .bind(a.start_time.to_string())
            .bind(a.end_time.to_string())
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        let result = sqlx::query("UPDATE schedules SET status_id = $2 WHERE id = $1")
            .bind(schedule_id)
            .bind(schedule_status::SOLVED)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Rewrite stored start/end times from `time_config` for every
    /// assignment of a schedule whose day and slot range still fit.
    ///
    /// Returns the number of rows whose times changed.
    pub(crate) async fn rederive_times_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        schedule_id: DbId,
        time_config: &TimeConfig,
    ) -> Result<u64, sqlx::Error> {
        let grid = SlotGrid::derive(time_config);
        let rows: Vec<(DbId, String, i32, i32, String, String)> = sqlx::query_as(
            "SELECT id, day, slot_index, duration, start_time, end_time
             FROM assignments WHERE schedule_id = $1
             FOR UPDATE",
        )
        .bind(schedule_id)
        .fetch_all(&mut **tx)
        .await?;

        let mut updated = 0;
        for (id, day, slot_index, duration, start_time, end_time) in rows {
            let fits = day.parse::<Weekday>().is_ok_and(|d| grid.has_day(d));
            let span = match (u32::try_from(slot_index), u32::try_from(duration)) {
                (Ok(index), Ok(duration)) if fits => grid.span_times(index, duration),
                _ => None,
            };
            let Some((start, end)) = span else {
                continue;
            };
            let (start, end) = (start.to_string(), end.to_string());
            if start == start_time && end == end_time {
                continue;
            }
            let result =
                sqlx::query("UPDATE assignments SET start_time = $2, end_time = $3 WHERE id = $1")
                    .bind(id)
                    .bind(start)
                    .bind(end)
                    .execute(&mut **tx)
                    .await?;
            updated += result.rows_affected();
        }
        Ok(updated)
    }
}

fn week_order() -> Vec<&'static str> {
    Weekday::ALL.iter().map(|d| d.as_str()).collect()
}

fn to_i32(value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
