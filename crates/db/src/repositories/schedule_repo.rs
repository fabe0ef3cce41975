//! Repository for the `schedules` and `time_configs` tables, including
//! the solve-in-progress token.

use std::time::Duration;

use sqlx::PgPool;
use timetable_core::time_config::TimeConfig;
use timetable_core::types::{DbId, Timestamp};

use crate::decode_error;
use crate::models::schedule::{
    CreateSchedule, Schedule, TimeConfigColumns, TimeConfigRow, UpdateSchedule,
};
use crate::models::status::StatusId;
use crate::repositories::assignment_repo::AssignmentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, semester, status_id, solve_started_at, created_at, updated_at";

const TIME_CONFIG_COLUMNS: &str = "schedule_id, days, start_minute, end_minute, slot_duration, \
    break_start_minute, break_end_minute";

/// Provides CRUD operations for schedules and their time configuration.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Insert a schedule (status Draft) with its time configuration.
    ///
    /// The configuration must already be validated.
    pub async fn create(pool: &PgPool, input: &CreateSchedule) -> Result<Schedule, sqlx::Error> {
        let columns = TimeConfigColumns::try_from(&input.time_config).map_err(decode_error)?;
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO schedules (name, semester) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, Schedule>(&query)
            .bind(input.name.trim())
            .bind(input.semester.trim())
            .fetch_one(&mut *tx)
            .await?;

        Self::upsert_time_config_inner(&mut tx, schedule.id, &columns).await?;

        tx.commit().await?;
        Ok(schedule)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all schedules, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Schedule>(&query).fetch_all(pool).await
    }

    /// Update a schedule. Only non-`None` fields in `input` are applied.
    ///
    /// A present `time_config` is upserted in the same transaction and
    /// the stored display times of existing assignments are re-derived
    /// from it. Assignments that no longer fit the new grid are left as
    /// they are. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSchedule,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let columns = input
            .time_config
            .as_ref()
            .map(TimeConfigColumns::try_from)
            .transpose()
            .map_err(decode_error)?;

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE schedules SET
                name = COALESCE($2, name),
                semester = COALESCE($3, semester),
                status_id = COALESCE($4, status_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.semester)
            .bind(input.status_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(schedule) = schedule else {
            return Ok(None);
        };

        if let (Some(columns), Some(time_config)) = (&columns, &input.time_config) {
            Self::upsert_time_config_inner(&mut tx, id, columns).await?;
            let updated = AssignmentRepo::rederive_times_inner(&mut tx, id, time_config).await?;
            tracing::debug!(schedule_id = id, updated, "Re-derived assignment times");
        }

        tx.commit().await?;
        Ok(Some(schedule))
    }

    /// Delete a schedule with its time configuration, assignments and
    /// solver runs. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Raw time configuration row for a schedule.
    pub async fn find_time_config_row(
        pool: &PgPool,
        schedule_id: DbId,
    ) -> Result<Option<TimeConfigRow>, sqlx::Error> {
        let query =
            format!("SELECT {TIME_CONFIG_COLUMNS} FROM time_configs WHERE schedule_id = $1");
        sqlx::query_as::<_, TimeConfigRow>(&query)
            .bind(schedule_id)
            .fetch_optional(pool)
            .await
    }

    /// Decoded time configuration for a schedule, if one exists.
    pub async fn find_time_config(
        pool: &PgPool,
        schedule_id: DbId,
    ) -> Result<Option<TimeConfig>, sqlx::Error> {
        Self::find_time_config_row(pool, schedule_id)
            .await?
            .map(|row| row.to_time_config().map_err(decode_error))
            .transpose()
    }

    /// Set the status without checking the transition.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE schedules SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically take the solve-in-progress token.
    ///
    /// Succeeds when no token is held, or when the held token is older
    /// than `stale_after` (its holder is presumed dead). Returns the new
    /// token, or `None` when another solve holds it or the schedule does
    /// not exist.
    pub async fn try_begin_solve(
        pool: &PgPool,
        id: DbId,
        stale_after: Duration,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "UPDATE schedules SET solve_started_at = NOW()
             WHERE id = $1
               AND (solve_started_at IS NULL
                    OR solve_started_at < NOW() - make_interval(secs => $2))
             RETURNING solve_started_at",
        )
        .bind(id)
        .bind(stale_after.as_secs_f64())
        .fetch_optional(pool)
        .await
    }

    /// Release the solve-in-progress token if it is still `token`.
    ///
    /// A token taken over after going stale is left to its new holder.
    pub async fn end_solve(pool: &PgPool, id: DbId, token: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE schedules SET solve_started_at = NULL
             WHERE id = $1 AND solve_started_at = $2",
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_time_config_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        schedule_id: DbId,
        columns: &TimeConfigColumns,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO time_configs
                (schedule_id, days, start_minute, end_minute, slot_duration,
                 break_start_minute, break_end_minute)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_time_configs_schedule_id DO UPDATE SET
                days = EXCLUDED.days,
                start_minute = EXCLUDED.start_minute,
                end_minute = EXCLUDED.end_minute,
                slot_duration = EXCLUDED.slot_duration,
                break_start_minute = EXCLUDED.break_start_minute,
                break_end_minute = EXCLUDED.break_end_minute",
        )
        .bind(schedule_id)
        .bind(&columns.days)
        .bind(columns.start_minute)
        .bind(columns.end_minute)
        .bind(columns.slot_duration)
        .bind(columns.break_start_minute)
        .bind(columns.break_end_minute)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

