//! Repository for the `rooms` table.

use sqlx::types::Json;
use sqlx::PgPool;
use timetable_core::availability::Availability;
use timetable_core::types::DbId;

use crate::models::room::{CreateRoom, Room, UpdateRoom};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, room_type, capacity, availability, created_at, updated_at";

/// Provides CRUD operations for rooms.
pub struct RoomRepo;

impl RoomRepo {
    /// Insert a new room. Availability defaults to the full standard grid.
    pub async fn create(pool: &PgPool, input: &CreateRoom) -> Result<Room, sqlx::Error> {
        let availability = input
            .availability
            .clone()
            .unwrap_or_else(Availability::standard);
        let query = format!(
            "INSERT INTO rooms (name, room_type, capacity, availability)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(input.name.trim())
            .bind(input.kind.as_str())
            .bind(input.capacity)
            .bind(Json(availability))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all rooms ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms ORDER BY name, id");
        sqlx::query_as::<_, Room>(&query).fetch_all(pool).await
    }

    /// Update a room. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoom,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!(
            "UPDATE rooms SET
                name = COALESCE($2, name),
                room_type = COALESCE($3, room_type),
                capacity = COALESCE($4, capacity),
                availability = COALESCE($5, availability)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.kind.map(|k| k.as_str()))
            .bind(input.capacity)
            .bind(input.availability.clone().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Replace a room's availability.
    pub async fn set_availability(
        pool: &PgPool,
        id: DbId,
        availability: &Availability,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("UPDATE rooms SET availability = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(Json(availability))
            .fetch_optional(pool)
            .await
    }

    /// Delete a room. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
