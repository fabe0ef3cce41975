//! Repository for the `courses`, `sections` and `lab_groups` tables.

use std::collections::HashMap;

use sqlx::PgPool;
use timetable_core::types::DbId;

use crate::models::course::{
    lab_group_names, Course, CourseWithSections, CreateCourse, LabGroup, Section, SectionCourse,
    SectionWithGroups, UpdateCourse,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, code, name, course_type, hours_per_week, sessions_per_week, created_at, updated_at";

const SECTION_COLUMNS: &str = "id, course_id, name, created_at";

const LAB_GROUP_COLUMNS: &str = "id, section_id, name, created_at";

/// Provides CRUD operations for courses and their sections.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a course with its sections and lab groups in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCourse,
    ) -> Result<CourseWithSections, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO courses (code, name, course_type, hours_per_week, sessions_per_week)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(input.kind.as_str())
            .bind(input.hours_per_week)
            .bind(input.sessions_per_week)
            .fetch_one(&mut *tx)
            .await?;

        let group_names = lab_group_names(input.lab_groups_per_section.unwrap_or(0));
        let section_query = format!(
            "INSERT INTO sections (course_id, name) VALUES ($1, $2) RETURNING {SECTION_COLUMNS}"
        );
        let group_query = format!(
            "INSERT INTO lab_groups (section_id, name) VALUES ($1, $2) RETURNING {LAB_GROUP_COLUMNS}"
        );

        let mut sections = Vec::with_capacity(input.sections.len());
        for name in &input.sections {
            let section = sqlx::query_as::<_, Section>(&section_query)
                .bind(course.id)
                .bind(name.trim())
                .fetch_one(&mut *tx)
                .await?;
            let mut lab_groups = Vec::with_capacity(group_names.len());
            for group in &group_names {
                let lab_group = sqlx::query_as::<_, LabGroup>(&group_query)
                    .bind(section.id)
                    .bind(group)
                    .fetch_one(&mut *tx)
                    .await?;
                lab_groups.push(lab_group);
            }
            sections.push(SectionWithGroups {
                section,
                lab_groups,
            });
        }

        tx.commit().await?;
        Ok(CourseWithSections { course, sections })
    }

    /// Find a course by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course by ID, enriched with its sections and lab groups.
    pub async fn find_with_sections(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CourseWithSections>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(course) => Ok(Self::attach_sections(pool, vec![course]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List all courses with sections, ordered by code.
    pub async fn list_with_sections(pool: &PgPool) -> Result<Vec<CourseWithSections>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY code");
        let courses = sqlx::query_as::<_, Course>(&query).fetch_all(pool).await?;
        Self::attach_sections(pool, courses).await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                hours_per_week = COALESCE($4, hours_per_week),
                sessions_per_week = COALESCE($5, sessions_per_week)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.hours_per_week)
            .bind(input.sessions_per_week)
            .fetch_optional(pool)
            .await
    }

    /// Delete a course and, by cascade, its sections and lab groups. Fails
    /// with a foreign-key violation while any assignment still references
    /// one of its sections. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Look up sections with their owning course, in input order.
    ///
    /// Unknown section IDs are simply absent from the result.
    pub async fn sections_with_courses(
        pool: &PgPool,
        section_ids: &[DbId],
    ) -> Result<Vec<SectionCourse>, sqlx::Error> {
        sqlx::query_as::<_, SectionCourse>(
            "SELECT s.id AS section_id, c.id AS course_id, c.code AS course_code
             FROM UNNEST($1::BIGINT[]) WITH ORDINALITY AS req(section_id, ord)
             JOIN sections s ON s.id = req.section_id
             JOIN courses c ON c.id = s.course_id
             ORDER BY req.ord",
        )
        .bind(section_ids)
        .fetch_all(pool)
        .await
    }

    /// Load sections and lab groups for `courses` with two queries.
    async fn attach_sections(
        pool: &PgPool,
        courses: Vec<Course>,
    ) -> Result<Vec<CourseWithSections>, sqlx::Error> {
        let course_ids: Vec<DbId> = courses.iter().map(|c| c.id).collect();

        let section_query = format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE course_id = ANY($1) ORDER BY name, id"
        );
        let sections = sqlx::query_as::<_, Section>(&section_query)
            .bind(&course_ids)
            .fetch_all(pool)
            .await?;

        let section_ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
        let group_query = format!(
            "SELECT {LAB_GROUP_COLUMNS} FROM lab_groups WHERE section_id = ANY($1) ORDER BY id"
        );
        let groups = sqlx::query_as::<_, LabGroup>(&group_query)
            .bind(&section_ids)
            .fetch_all(pool)
            .await?;

        let mut groups_by_section: HashMap<DbId, Vec<LabGroup>> = HashMap::new();
        for group in groups {
            groups_by_section.entry(group.section_id).or_default().push(group);
        }
        let mut sections_by_course: HashMap<DbId, Vec<SectionWithGroups>> = HashMap::new();
        for section in sections {
            let lab_groups = groups_by_section.remove(&section.id).unwrap_or_default();
            sections_by_course
                .entry(section.course_id)
                .or_default()
                .push(SectionWithGroups {
                    section,
                    lab_groups,
                });
        }

        Ok(courses
            .into_iter()
            .map(|course| CourseWithSections {
                sections: sections_by_course.remove(&course.id).unwrap_or_default(),
                course,
            })
            .collect())
    }
}
