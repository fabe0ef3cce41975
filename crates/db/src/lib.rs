//! Postgres persistence for timetable entities, schedules, assignments and
//! solver runs.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Round-trip a trivial query to confirm the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Wrap a domain conversion failure on a row as a decode error.
///
/// CHECK constraints keep stored kinds and days valid, so this only fires
/// on rows written outside the application.
pub(crate) fn decode_error(err: timetable_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
