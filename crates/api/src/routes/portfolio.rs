use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use stratos_core::analytics::{summarize_portfolio, value_holding};
use stratos_core::domain::portfolio::{
    HoldingInput, HoldingUpdate, HoldingValuation, PortfolioHolding, PortfolioSummary,
};
use stratos_core::domain::stock::StockRecord;
use stratos_core::ingest::{fetch_keyed, fetch_record};
use stratos_core::storage::holdings;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(portfolio_summary))
        .route("/portfolio/holdings", get(list_holdings).post(add_holding))
        .route(
            "/portfolio/holdings/:id",
            get(get_holding).put(update_holding).delete(delete_holding),
        )
}

fn holding_not_found() -> ApiError {
    ApiError::not_found("Holding not found")
}

/// One fetch per distinct symbol; unresolved symbols are simply missing from the map.
async fn records_by_symbol(
    state: &AppState,
    holdings: &[PortfolioHolding],
) -> HashMap<String, StockRecord> {
    let mut symbols: Vec<String> = Vec::new();
    for h in holdings {
        if !symbols.contains(&h.symbol) {
            symbols.push(h.symbol.clone());
        }
    }
    fetch_keyed(state.source.as_ref(), &symbols)
        .await
        .into_iter()
        .collect()
}

async fn portfolio_summary(State(state): State<AppState>) -> ApiResult<Json<PortfolioSummary>> {
    let pool = state.pool()?;
    let holdings = holdings::list(pool).await?;
    let records = records_by_symbol(&state, &holdings).await;
    Ok(Json(summarize_portfolio(&holdings, &records)))
}

async fn list_holdings(State(state): State<AppState>) -> ApiResult<Json<Vec<PortfolioHolding>>> {
    let pool = state.pool()?;
    Ok(Json(holdings::list(pool).await?))
}

async fn add_holding(
    State(state): State<AppState>,
    Json(input): Json<HoldingInput>,
) -> ApiResult<Json<PortfolioHolding>> {
    let pool = state.pool()?;
    holdings::validate_input(&input).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let holding = holdings::create(pool, &input).await?;
    tracing::info!(id = %holding.id, symbol = %holding.symbol, "holding added");
    Ok(Json(holding))
}

async fn get_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<HoldingValuation>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    let holding = holdings::get(pool, id).await?.ok_or_else(holding_not_found)?;
    let record = fetch_record(state.source.as_ref(), &holding.symbol).await;
    Ok(Json(value_holding(&holding, record.as_ref())))
}

async fn update_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<HoldingUpdate>,
) -> ApiResult<Json<PortfolioHolding>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    holdings::validate_update(&update).map_err(|e| ApiError::bad_request(e.to_string()))?;
    holdings::update(pool, id, &update)
        .await?
        .map(Json)
        .ok_or_else(holding_not_found)
}

async fn delete_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = state.pool()?;
    let id = super::parse_id(&id)?;
    if !holdings::delete(pool, id).await? {
        return Err(holding_not_found());
    }
    Ok(Json(json!({ "message": format!("Holding {id} deleted") })))
}
