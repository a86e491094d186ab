use super::watchlist::ActiveQuery;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use stratos_core::alerts::check_active_alerts;
use stratos_core::domain::user::{Alert, AlertCheck, AlertInput};
use stratos_core::storage::alerts;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts).post(create_alert))
        .route("/alerts/check/all", get(check_all))
        .route("/alerts/symbol/:symbol", get(alerts_for_symbol))
        .route("/alerts/:id", get(get_alert).delete(delete_alert))
        .route("/alerts/:id/deactivate", post(deactivate_alert))
        .route("/alerts/:id/reactivate", post(reactivate_alert))
}

fn alert_not_found() -> ApiError {
    ApiError::not_found("Alert not found")
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<Alert>>> {
    let pool = state.pool()?;
    Ok(Json(alerts::list(pool, query.active_only).await?))
}

async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<AlertInput>,
) -> ApiResult<Json<Alert>> {
    let pool = state.pool()?;
    alerts::parse_input(&input).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let alert = alerts::create(pool, &input).await?;
    tracing::info!(
        id = %alert.id,
        symbol = %alert.symbol,
        kind = %alert.alert_type,
        "alert created"
    );
    Ok(Json(alert))
}

async fn get_alert(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Alert>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    alerts::get(pool, id)
        .await?
        .map(Json)
        .ok_or_else(alert_not_found)
}

async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    if !alerts::delete(pool, id).await? {
        return Err(alert_not_found());
    }
    Ok(Json(json!({ "message": format!("Alert {id} deleted") })))
}

async fn deactivate_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Alert>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    alerts::deactivate(pool, id)
        .await?
        .map(Json)
        .ok_or_else(alert_not_found)
}

async fn reactivate_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Alert>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    alerts::reactivate(pool, id)
        .await?
        .map(Json)
        .ok_or_else(alert_not_found)
}

/// Evaluates every active alert and records first-time triggers.
async fn check_all(State(state): State<AppState>) -> ApiResult<Json<Vec<AlertCheck>>> {
    let pool = state.pool()?;
    let checks = check_active_alerts(pool, state.source.as_ref(), true).await?;
    Ok(Json(checks))
}

async fn alerts_for_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<Alert>>> {
    let pool = state.pool()?;
    Ok(Json(
        alerts::list_for_symbol(pool, &symbol, query.active_only).await?,
    ))
}
