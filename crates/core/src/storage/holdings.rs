use crate::domain::portfolio::{HoldingInput, HoldingUpdate, PortfolioHolding};
use crate::domain::user::normalize_symbol;
use anyhow::{ensure, Context};
use chrono::Utc;
use uuid::Uuid;

const COLUMNS: &str =
    "id, symbol, shares, purchase_price, purchase_date, notes, created_at, updated_at";

fn ensure_positive(field: &str, value: f64) -> anyhow::Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{field} must be greater than 0 (got {value})"
    );
    Ok(())
}

pub fn validate_input(input: &HoldingInput) -> anyhow::Result<()> {
    ensure!(
        !normalize_symbol(&input.symbol).is_empty(),
        "symbol must be non-empty"
    );
    ensure_positive("shares", input.shares)?;
    ensure_positive("purchase_price", input.purchase_price)
}

pub fn validate_update(update: &HoldingUpdate) -> anyhow::Result<()> {
    if let Some(shares) = update.shares {
        ensure_positive("shares", shares)?;
    }
    if let Some(price) = update.purchase_price {
        ensure_positive("purchase_price", price)?;
    }
    Ok(())
}

pub async fn create(pool: &sqlx::PgPool, input: &HoldingInput) -> anyhow::Result<PortfolioHolding> {
    validate_input(input)?;
    let symbol = normalize_symbol(&input.symbol);

    sqlx::query_as::<_, PortfolioHolding>(&format!(
        "INSERT INTO portfolio_holdings (id, symbol, shares, purchase_price, purchase_date, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&symbol)
    .bind(input.shares)
    .bind(input.purchase_price)
    .bind(input.purchase_date.unwrap_or_else(Utc::now))
    .bind(&input.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert portfolio_holdings failed (symbol={symbol})"))
}

pub async fn list(pool: &sqlx::PgPool) -> anyhow::Result<Vec<PortfolioHolding>> {
    sqlx::query_as::<_, PortfolioHolding>(&format!(
        "SELECT {COLUMNS} FROM portfolio_holdings ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
    .context("select portfolio_holdings failed")
}

pub async fn get(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<PortfolioHolding>> {
    sqlx::query_as::<_, PortfolioHolding>(&format!(
        "SELECT {COLUMNS} FROM portfolio_holdings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select portfolio_holdings failed (id={id})"))
}

/// Partial update: `None` fields keep their stored value.
pub async fn update(
    pool: &sqlx::PgPool,
    id: Uuid,
    update: &HoldingUpdate,
) -> anyhow::Result<Option<PortfolioHolding>> {
    validate_update(update)?;

    sqlx::query_as::<_, PortfolioHolding>(&format!(
        "UPDATE portfolio_holdings \
            SET shares = COALESCE($2, shares), \
                purchase_price = COALESCE($3, purchase_price), \
                purchase_date = COALESCE($4, purchase_date), \
                notes = COALESCE($5, notes), \
                updated_at = now() \
          WHERE id = $1 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(update.shares)
    .bind(update.purchase_price)
    .bind(update.purchase_date)
    .bind(&update.notes)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("update portfolio_holdings failed (id={id})"))
}

pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM portfolio_holdings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete portfolio_holdings failed (id={id})"))?;
    Ok(res.rows_affected() > 0)
}
