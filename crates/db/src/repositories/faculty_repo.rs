//! Repository for the `faculty` and `faculty_courses` tables.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;
use timetable_core::availability::Availability;
use timetable_core::types::DbId;

use crate::models::faculty::{CreateFaculty, Faculty, FacultyWithCourses, UpdateFaculty};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, faculty_type, max_hours, availability, created_at, updated_at";

/// Provides CRUD operations for faculty and their course qualifications.
pub struct FacultyRepo;

impl FacultyRepo {
    /// Insert a faculty member with qualifications in one transaction.
    ///
    /// Availability defaults to the full standard grid when omitted.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFaculty,
    ) -> Result<FacultyWithCourses, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let availability = input
            .availability
            .clone()
            .unwrap_or_else(Availability::standard);
        let query = format!(
            "INSERT INTO faculty (name, email, faculty_type, max_hours, availability)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let faculty = sqlx::query_as::<_, Faculty>(&query)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.kind.as_str())
            .bind(input.max_hours)
            .bind(Json(availability))
            .fetch_one(&mut *tx)
            .await?;

        Self::set_courses_inner(&mut tx, faculty.id, &input.course_ids).await?;

        tx.commit().await?;
        Ok(FacultyWithCourses {
            faculty,
            course_ids: dedup(&input.course_ids),
        })
    }

    /// Find a faculty member by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Faculty>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM faculty WHERE id = $1");
        sqlx::query_as::<_, Faculty>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a faculty member by ID, enriched with qualified course IDs.
    pub async fn find_with_courses(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FacultyWithCourses>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(faculty) => Ok(Self::attach_courses(pool, vec![faculty]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List all faculty with qualifications, ordered by name.
    pub async fn list_with_courses(pool: &PgPool) -> Result<Vec<FacultyWithCourses>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM faculty ORDER BY name, id");
        let faculty = sqlx::query_as::<_, Faculty>(&query).fetch_all(pool).await?;
        Self::attach_courses(pool, faculty).await
    }

    /// Update a faculty member. Only non-`None` fields are applied; a
    /// present `course_ids` replaces all qualifications.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFaculty,
    ) -> Result<Option<FacultyWithCourses>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE faculty SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                faculty_type = COALESCE($4, faculty_type),
                max_hours = COALESCE($5, max_hours),
                availability = COALESCE($6, availability)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let faculty = sqlx::query_as::<_, Faculty>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.kind.map(|k| k.as_str()))
            .bind(input.max_hours)
            .bind(input.availability.clone().map(Json))
            .fetch_optional(&mut *tx)
            .await?;

        let Some(faculty) = faculty else {
            return Ok(None);
        };

        if let Some(course_ids) = &input.course_ids {
            Self::set_courses_inner(&mut tx, id, course_ids).await?;
        }

        tx.commit().await?;
        Ok(Self::attach_courses(pool, vec![faculty]).await?.pop())
    }

    /// Replace a faculty member's availability.
    pub async fn set_availability(
        pool: &PgPool,
        id: DbId,
        availability: &Availability,
    ) -> Result<Option<Faculty>, sqlx::Error> {
        let query =
            format!("UPDATE faculty SET availability = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Faculty>(&query)
            .bind(id)
            .bind(Json(availability))
            .fetch_optional(pool)
            .await
    }

    /// Delete a faculty member. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Qualified course IDs for each faculty member in `faculty_ids`.
    pub async fn course_ids_by_faculty(
        pool: &PgPool,
        faculty_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<DbId>>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT faculty_id, course_id FROM faculty_courses
             WHERE faculty_id = ANY($1)
             ORDER BY faculty_id, course_id",
        )
        .bind(faculty_ids)
        .fetch_all(pool)
        .await?;

        let mut by_faculty: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (faculty_id, course_id) in rows {
            by_faculty.entry(faculty_id).or_default().push(course_id);
        }
        Ok(by_faculty)
    }

    async fn attach_courses(
        pool: &PgPool,
        faculty: Vec<Faculty>,
    ) -> Result<Vec<FacultyWithCourses>, sqlx::Error> {
        let ids: Vec<DbId> = faculty.iter().map(|f| f.id).collect();
        let mut by_faculty = Self::course_ids_by_faculty(pool, &ids).await?;
        Ok(faculty
            .into_iter()
            .map(|f| FacultyWithCourses {
                course_ids: by_faculty.remove(&f.id).unwrap_or_default(),
                faculty: f,
            })
            .collect())
    }

    async fn set_courses_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        faculty_id: DbId,
        course_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM faculty_courses WHERE faculty_id = $1")
            .bind(faculty_id)
            .execute(&mut **tx)
            .await?;

        for course_id in dedup(course_ids) {
            sqlx::query("INSERT INTO faculty_courses (faculty_id, course_id) VALUES ($1, $2)")
                .bind(faculty_id)
                .bind(course_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

/// Sorted, de-duplicated copy of `ids`.
fn dedup(ids: &[DbId]) -> Vec<DbId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
