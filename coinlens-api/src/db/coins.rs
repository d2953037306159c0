//! Coin record operations

use coinlens_common::{CoinAnalysis, CoinRecord, Error, Result};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

/// Insert a newly identified coin
///
/// `created_at` is assigned by the database.
pub async fn insert_coin(pool: &SqlitePool, id: &str, analysis: &CoinAnalysis) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coins (id, name, description, year, country)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&analysis.name)
    .bind(&analysis.description)
    .bind(&analysis.year)
    .bind(&analysis.country)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all coins, most recent first
///
/// Rows that fail to decode are logged and skipped so a single bad row does
/// not fail the whole listing.
pub async fn list_coins(pool: &SqlitePool) -> Result<Vec<CoinRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, year, country, created_at
        FROM coins
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let coins = rows
        .iter()
        .filter_map(|row| match CoinRecord::from_row(row) {
            Ok(coin) => Some(coin),
            Err(e) => {
                warn!("Skipping undecodable coin row: {}", e);
                None
            }
        })
        .collect();

    Ok(coins)
}

/// Load a single coin by id
pub async fn get_coin(pool: &SqlitePool, id: &str) -> Result<Option<CoinRecord>> {
    let coin = sqlx::query_as::<_, CoinRecord>(
        "SELECT id, name, description, year, country, created_at FROM coins WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(coin)
}

/// Rename a coin and return the updated row
pub async fn update_coin_name(pool: &SqlitePool, id: &str, name: &str) -> Result<CoinRecord> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput("Missing coin ID".to_string()));
    }
    // Stricter than an empty-string check: whitespace-only names are rejected too
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Name is required".to_string()));
    }

    let coin = sqlx::query_as::<_, CoinRecord>(
        r#"
        UPDATE coins SET name = ?
        WHERE id = ?
        RETURNING id, name, description, year, country, created_at
        "#,
    )
    .bind(name)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    coin.ok_or_else(|| Error::NotFound(format!("Coin not found: {}", id)))
}
