use crate::domain::user::{normalize_symbol, WatchlistInput, WatchlistItem};
use anyhow::Context;
use uuid::Uuid;

const COLUMNS: &str = "id, symbol, added_at, notes, target_price, is_active";

pub async fn list(pool: &sqlx::PgPool, active_only: bool) -> anyhow::Result<Vec<WatchlistItem>> {
    sqlx::query_as::<_, WatchlistItem>(&format!(
        "SELECT {COLUMNS} FROM watchlist \
         WHERE ($1 = FALSE OR is_active) \
         ORDER BY added_at ASC"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await
    .context("select watchlist failed")
}

/// Adds a symbol, or reactivates an existing (possibly soft-deleted) entry and overwrites its
/// notes and target price. Never produces a duplicate row.
pub async fn upsert(pool: &sqlx::PgPool, input: &WatchlistInput) -> anyhow::Result<WatchlistItem> {
    let symbol = normalize_symbol(&input.symbol);
    anyhow::ensure!(!symbol.is_empty(), "symbol must be non-empty");

    sqlx::query_as::<_, WatchlistItem>(&format!(
        "INSERT INTO watchlist (id, symbol, notes, target_price, is_active) \
         VALUES ($1, $2, $3, $4, TRUE) \
         ON CONFLICT (symbol) DO UPDATE \
           SET is_active = TRUE, \
               notes = EXCLUDED.notes, \
               target_price = EXCLUDED.target_price \
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&symbol)
    .bind(&input.notes)
    .bind(input.target_price)
    .fetch_one(pool)
    .await
    .with_context(|| format!("upsert watchlist failed (symbol={symbol})"))
}

/// Soft delete. Returns false when the symbol was never on the watchlist.
pub async fn deactivate(pool: &sqlx::PgPool, symbol: &str) -> anyhow::Result<bool> {
    let symbol = normalize_symbol(symbol);
    let res = sqlx::query("UPDATE watchlist SET is_active = FALSE WHERE symbol = $1")
        .bind(&symbol)
        .execute(pool)
        .await
        .with_context(|| format!("deactivate watchlist failed (symbol={symbol})"))?;
    Ok(res.rows_affected() > 0)
}
