use crate::domain::user::{Alert, AlertCheck, AlertKind};
use crate::ingest::{fetch_keyed, StockRecordSource};
use crate::storage;
use std::collections::HashMap;

/// Evaluates one alert against a freshly fetched price. Does not mutate the alert; persisting a
/// trigger is the caller's job (and only happens once, see `storage::alerts::mark_triggered`).
pub fn evaluate_alert(alert: &Alert, current_price: Option<f64>) -> AlertCheck {
    let symbol = &alert.symbol;
    let target = alert.target_value;

    let (should_trigger, message) = match (current_price, alert.alert_type) {
        (None, _) => (false, format!("Could not fetch price for {symbol}")),
        (Some(price), AlertKind::PriceAbove) => {
            if price >= target {
                (
                    true,
                    format!("{symbol} is at ${price:.2}, above target ${target:.2}"),
                )
            } else {
                (
                    false,
                    format!("{symbol} is at ${price:.2}, below target ${target:.2}"),
                )
            }
        }
        (Some(price), AlertKind::PriceBelow) => {
            if price <= target {
                (
                    true,
                    format!("{symbol} is at ${price:.2}, below target ${target:.2}"),
                )
            } else {
                (
                    false,
                    format!("{symbol} is at ${price:.2}, above target ${target:.2}"),
                )
            }
        }
        (Some(_), AlertKind::PercentChange) => (
            false,
            "Percent change alerts require price history (not yet implemented)".to_string(),
        ),
    };

    AlertCheck {
        alert: alert.clone(),
        current_price,
        should_trigger,
        message,
    }
}

/// Evaluates every active alert against one fresh price per symbol, in stored order.
///
/// With `persist` set, newly triggered alerts are marked in storage and the returned check
/// carries the stored trigger state.
pub async fn check_active_alerts(
    pool: &sqlx::PgPool,
    source: &dyn StockRecordSource,
    persist: bool,
) -> anyhow::Result<Vec<AlertCheck>> {
    let alerts = storage::alerts::list(pool, true).await?;

    let mut symbols: Vec<String> = Vec::new();
    for alert in &alerts {
        if !symbols.contains(&alert.symbol) {
            symbols.push(alert.symbol.clone());
        }
    }
    let prices: HashMap<String, f64> = fetch_keyed(source, &symbols)
        .await
        .into_iter()
        .filter(|(_, r)| r.price > 0.0)
        .map(|(symbol, r)| (symbol, r.price))
        .collect();

    let mut checks = Vec::with_capacity(alerts.len());
    for alert in &alerts {
        let mut check = evaluate_alert(alert, prices.get(&alert.symbol).copied());
        if persist && check.should_trigger && !alert.is_triggered {
            if storage::alerts::mark_triggered(pool, alert.id).await? {
                tracing::info!(alert_id = %alert.id, symbol = %alert.symbol, "alert triggered");
            }
            if let Some(stored) = storage::alerts::get(pool, alert.id).await? {
                check.alert = stored;
            }
        }
        checks.push(check);
    }

    Ok(checks)
}
