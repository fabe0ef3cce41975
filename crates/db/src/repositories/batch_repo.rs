//! Repository for the `batches` and `batch_sections` tables.

use std::collections::HashMap;

use sqlx::PgPool;
use timetable_core::types::DbId;

use crate::models::batch::{Batch, BatchWithSections, CreateBatch, UpdateBatch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, student_count, created_at, updated_at";

/// Provides CRUD operations for batches and their section enrollments.
///
/// Enrollment rules are checked by the caller; the repository only
/// enforces what the schema does.
pub struct BatchRepo;

impl BatchRepo {
    /// Insert a batch with its enrollments in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBatch,
    ) -> Result<BatchWithSections, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO batches (name, student_count) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let batch = sqlx::query_as::<_, Batch>(&query)
            .bind(input.name.trim())
            .bind(input.student_count)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_sections_inner(&mut tx, batch.id, &input.section_ids).await?;

        tx.commit().await?;
        Ok(BatchWithSections {
            batch,
            section_ids: input.section_ids.clone(),
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Batch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batches WHERE id = $1");
        sqlx::query_as::<_, Batch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a batch by ID, enriched with enrolled section IDs.
    pub async fn find_with_sections(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BatchWithSections>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(batch) => Ok(Self::attach_sections(pool, vec![batch]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List all batches with enrollments, ordered by name.
    pub async fn list_with_sections(pool: &PgPool) -> Result<Vec<BatchWithSections>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batches ORDER BY name, id");
        let batches = sqlx::query_as::<_, Batch>(&query).fetch_all(pool).await?;
        Self::attach_sections(pool, batches).await
    }

    /// Update a batch. A present `section_ids` replaces all enrollments.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBatch,
    ) -> Result<Option<BatchWithSections>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE batches SET
                name = COALESCE($2, name),
                student_count = COALESCE($3, student_count)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let batch = sqlx::query_as::<_, Batch>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.student_count)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(batch) = batch else {
            return Ok(None);
        };

        if let Some(section_ids) = &input.section_ids {
            Self::set_sections_inner(&mut tx, id, section_ids).await?;
        }

        tx.commit().await?;
        Ok(Self::attach_sections(pool, vec![batch]).await?.pop())
    }

    /// Delete a batch. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM batches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Enrolled section IDs for each batch in `batch_ids`.
    pub async fn section_ids_by_batch(
        pool: &PgPool,
        batch_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<DbId>>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT batch_id, section_id FROM batch_sections
             WHERE batch_id = ANY($1)
             ORDER BY batch_id, section_id",
        )
        .bind(batch_ids)
        .fetch_all(pool)
        .await?;

        let mut by_batch: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (batch_id, section_id) in rows {
            by_batch.entry(batch_id).or_default().push(section_id);
        }
        Ok(by_batch)
    }

    async fn attach_sections(
        pool: &PgPool,
        batches: Vec<Batch>,
    ) -> Result<Vec<BatchWithSections>, sqlx::Error> {
        let ids: Vec<DbId> = batches.iter().map(|b| b.id).collect();
        let mut by_batch = Self::section_ids_by_batch(pool, &ids).await?;
        Ok(batches
            .into_iter()
            .map(|b| BatchWithSections {
                section_ids: by_batch.remove(&b.id).unwrap_or_default(),
                batch: b,
            })
            .collect())
    }

    async fn set_sections_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        batch_id: DbId,
        section_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM batch_sections WHERE batch_id = $1")
            .bind(batch_id)
            .execute(&mut **tx)
            .await?;

        for &section_id in section_ids {
            sqlx::query("INSERT INTO batch_sections (batch_id, section_id) VALUES ($1, $2)")
                .bind(batch_id)
                .bind(section_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}
