use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use stratos_core::analytics::analyze_portfolio;
use stratos_core::domain::portfolio::PortfolioAnalysis;
use stratos_core::domain::recommendation::StockRecommendation;
use stratos_core::domain::stock::StockRecord;
use stratos_core::domain::user::normalize_symbol;
use stratos_core::ingest::{fetch_many, fetch_record};
use stratos_core::recommendation::rule_based_recommendation;

const MAX_PORTFOLIO_SYMBOLS: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analysis/stock/:symbol", get(stock_analysis))
        .route("/analysis/quick/:symbol", get(quick_analysis))
        .route("/analysis/portfolio", post(portfolio_analysis))
}

async fn resolve(state: &AppState, symbol: &str) -> ApiResult<StockRecord> {
    let symbol = normalize_symbol(symbol);
    fetch_record(state.source.as_ref(), &symbol)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Stock {symbol} not found")))
}

/// Configured strategy; advisory failures degrade to the rule-based verdict.
async fn stock_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<StockRecommendation>> {
    let stock = resolve(&state, &symbol).await?;
    Ok(Json(state.recommender.recommend(&stock).await))
}

async fn quick_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<StockRecommendation>> {
    let stock = resolve(&state, &symbol).await?;
    Ok(Json(rule_based_recommendation(&stock)))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbols: Vec<String>,
}

async fn portfolio_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Json<PortfolioAnalysis>> {
    let symbols: Vec<String> = req
        .symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(ApiError::bad_request("At least one stock symbol is required"));
    }
    if symbols.len() > MAX_PORTFOLIO_SYMBOLS {
        return Err(ApiError::bad_request(format!(
            "Maximum {MAX_PORTFOLIO_SYMBOLS} stocks can be analyzed at once"
        )));
    }

    let stocks = fetch_many(state.source.as_ref(), &symbols).await;
    if stocks.is_empty() {
        return Err(ApiError::not_found(
            "No valid stocks found for the provided symbols",
        ));
    }

    Ok(Json(analyze_portfolio(&stocks)))
}
