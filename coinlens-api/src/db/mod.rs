//! Database access for coinlens-api
//!
//! The record store is a single `coins` table. Image files are not referenced
//! from it; see [`coinlens_common::models`] for the naming convention.

pub mod coins;

use coinlens_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Pool acquisition timeout, applied while connecting at startup
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection pool
///
/// Creates the database file if missing and makes sure the schema exists.
pub async fn init_database_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    tracing::debug!("Connecting to database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect_with(options)
        .await?;

    // Equivalent of a ping: fails fast if the database is unusable
    sqlx::query("SELECT 1").execute(&pool).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the coins table if it doesn't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS coins (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            year TEXT NOT NULL,
            country TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (coins)");

    Ok(())
}
