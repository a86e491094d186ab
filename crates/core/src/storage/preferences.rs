use crate::domain::user::{PreferencesInput, UserPreferences};
use anyhow::Context;
use uuid::Uuid;

const COLUMNS: &str = "id, name, min_dividend_yield, max_pe_ratio, min_market_cap, max_beta, \
                       max_debt_to_equity, preferred_sectors, created_at, updated_at";

pub async fn find_by_name(
    pool: &sqlx::PgPool,
    name: &str,
) -> anyhow::Result<Option<UserPreferences>> {
    sqlx::query_as::<_, UserPreferences>(&format!(
        "SELECT {COLUMNS} FROM user_preferences WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select user_preferences failed (name={name})"))
}

/// First read of an unknown name creates the default record.
pub async fn get_or_create_default(
    pool: &sqlx::PgPool,
    name: &str,
) -> anyhow::Result<UserPreferences> {
    let defaults = PreferencesInput::defaults_for(name);
    sqlx::query(
        "INSERT INTO user_preferences \
         (id, name, min_dividend_yield, max_pe_ratio, min_market_cap, max_beta, max_debt_to_equity, preferred_sectors) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&defaults.name)
    .bind(defaults.min_dividend_yield)
    .bind(defaults.max_pe_ratio)
    .bind(defaults.min_market_cap)
    .bind(defaults.max_beta)
    .bind(defaults.max_debt_to_equity)
    .bind(&defaults.preferred_sectors)
    .execute(pool)
    .await
    .with_context(|| format!("insert default user_preferences failed (name={name})"))?;

    find_by_name(pool, name)
        .await?
        .with_context(|| format!("user_preferences missing after insert (name={name})"))
}

/// Create-or-replace by name. Every field is overwritten, including unset thresholds.
pub async fn upsert(
    pool: &sqlx::PgPool,
    input: &PreferencesInput,
) -> anyhow::Result<UserPreferences> {
    let name = input.name.trim();
    anyhow::ensure!(!name.is_empty(), "preferences name must be non-empty");

    sqlx::query_as::<_, UserPreferences>(&format!(
        "INSERT INTO user_preferences \
         (id, name, min_dividend_yield, max_pe_ratio, min_market_cap, max_beta, max_debt_to_equity, preferred_sectors) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (name) DO UPDATE \
           SET min_dividend_yield = EXCLUDED.min_dividend_yield, \
               max_pe_ratio = EXCLUDED.max_pe_ratio, \
               min_market_cap = EXCLUDED.min_market_cap, \
               max_beta = EXCLUDED.max_beta, \
               max_debt_to_equity = EXCLUDED.max_debt_to_equity, \
               preferred_sectors = EXCLUDED.preferred_sectors, \
               updated_at = now() \
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(input.min_dividend_yield)
    .bind(input.max_pe_ratio)
    .bind(input.min_market_cap)
    .bind(input.max_beta)
    .bind(input.max_debt_to_equity)
    .bind(input.normalized_sectors())
    .fetch_one(pool)
    .await
    .with_context(|| format!("upsert user_preferences failed (name={name})"))
}

pub async fn delete(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM user_preferences WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("delete user_preferences failed (name={name})"))?;
    Ok(res.rows_affected() > 0)
}
