use crate::domain::user::{normalize_symbol, Alert, AlertInput, AlertKind};
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const COLUMNS: &str = "id, symbol, alert_type, target_value, is_active, is_triggered, \
                       triggered_at, created_at, notes";

#[derive(Debug, sqlx::FromRow)]
struct AlertRow {
    id: Uuid,
    symbol: String,
    alert_type: String,
    target_value: f64,
    is_active: bool,
    is_triggered: bool,
    triggered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    notes: Option<String>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = anyhow::Error;

    fn try_from(row: AlertRow) -> anyhow::Result<Self> {
        let alert_type = row
            .alert_type
            .parse::<AlertKind>()
            .with_context(|| format!("stored alert {} has bad alert_type", row.id))?;
        Ok(Alert {
            id: row.id,
            symbol: row.symbol,
            alert_type,
            target_value: row.target_value,
            is_active: row.is_active,
            is_triggered: row.is_triggered,
            triggered_at: row.triggered_at,
            created_at: row.created_at,
            notes: row.notes,
        })
    }
}

fn into_alerts(rows: Vec<AlertRow>) -> anyhow::Result<Vec<Alert>> {
    rows.into_iter().map(Alert::try_from).collect()
}

/// Validates the kind before touching the database so callers can map the error to a 400.
pub fn parse_input(input: &AlertInput) -> anyhow::Result<(String, AlertKind)> {
    let symbol = normalize_symbol(&input.symbol);
    anyhow::ensure!(!symbol.is_empty(), "symbol must be non-empty");
    anyhow::ensure!(
        input.target_value.is_finite(),
        "target_value must be a finite number"
    );
    let kind = input.alert_type.parse::<AlertKind>()?;
    Ok((symbol, kind))
}

pub async fn create(pool: &sqlx::PgPool, input: &AlertInput) -> anyhow::Result<Alert> {
    let (symbol, kind) = parse_input(input)?;

    let row = sqlx::query_as::<_, AlertRow>(&format!(
        "INSERT INTO alerts (id, symbol, alert_type, target_value, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&symbol)
    .bind(kind.as_str())
    .bind(input.target_value)
    .bind(&input.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert alerts failed (symbol={symbol})"))?;

    row.try_into()
}

pub async fn list(pool: &sqlx::PgPool, active_only: bool) -> anyhow::Result<Vec<Alert>> {
    let rows = sqlx::query_as::<_, AlertRow>(&format!(
        "SELECT {COLUMNS} FROM alerts \
         WHERE ($1 = FALSE OR is_active) \
         ORDER BY created_at ASC"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await
    .context("select alerts failed")?;

    into_alerts(rows)
}

pub async fn list_for_symbol(
    pool: &sqlx::PgPool,
    symbol: &str,
    active_only: bool,
) -> anyhow::Result<Vec<Alert>> {
    let symbol = normalize_symbol(symbol);
    let rows = sqlx::query_as::<_, AlertRow>(&format!(
        "SELECT {COLUMNS} FROM alerts \
         WHERE symbol = $1 AND ($2 = FALSE OR is_active) \
         ORDER BY created_at ASC"
    ))
    .bind(&symbol)
    .bind(active_only)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select alerts failed (symbol={symbol})"))?;

    into_alerts(rows)
}

pub async fn get(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Alert>> {
    sqlx::query_as::<_, AlertRow>(&format!("SELECT {COLUMNS} FROM alerts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("select alerts failed (id={id})"))?
        .map(Alert::try_from)
        .transpose()
}

pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM alerts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete alerts failed (id={id})"))?;
    Ok(res.rows_affected() > 0)
}

/// Clears the active flag only; trigger state is kept.
pub async fn deactivate(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Alert>> {
    sqlx::query_as::<_, AlertRow>(&format!(
        "UPDATE alerts SET is_active = FALSE WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("deactivate alerts failed (id={id})"))?
    .map(Alert::try_from)
    .transpose()
}

/// Re-arms the alert: active again, trigger flag and timestamp cleared.
pub async fn reactivate(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Alert>> {
    sqlx::query_as::<_, AlertRow>(&format!(
        "UPDATE alerts \
            SET is_active = TRUE, is_triggered = FALSE, triggered_at = NULL \
          WHERE id = $1 \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("reactivate alerts failed (id={id})"))?
    .map(Alert::try_from)
    .transpose()
}

/// Sets the trigger flag once. Returns false when the alert is missing or already triggered,
/// so `triggered_at` always records the first trigger.
pub async fn mark_triggered(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE alerts SET is_triggered = TRUE, triggered_at = now() \
         WHERE id = $1 AND NOT is_triggered",
    )
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("mark alerts triggered failed (id={id})"))?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(kind: &str) -> AlertInput {
        AlertInput {
            symbol: " ko ".to_string(),
            alert_type: kind.to_string(),
            target_value: 60.0,
            notes: None,
        }
    }

    #[test]
    fn parse_input_normalizes_symbol_and_kind() {
        let (symbol, kind) = parse_input(&input("price_below")).unwrap();
        assert_eq!(symbol, "KO");
        assert_eq!(kind, AlertKind::PriceBelow);
    }

    #[test]
    fn parse_input_rejects_unknown_kind() {
        let err = parse_input(&input("moon")).unwrap_err();
        assert!(err.to_string().contains("invalid alert_type"));
    }

    #[test]
    fn row_with_unknown_kind_fails_conversion() {
        let row = AlertRow {
            id: Uuid::new_v4(),
            symbol: "KO".to_string(),
            alert_type: "legacy".to_string(),
            target_value: 1.0,
            is_active: true,
            is_triggered: false,
            triggered_at: None,
            created_at: Utc::now(),
            notes: None,
        };
        assert!(Alert::try_from(row).is_err());
    }
}
