use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stratos_core::domain::stock::{ScreeningCriteria, StockRecord};
use stratos_core::domain::user::normalize_symbol;
use stratos_core::ingest::universe::conservative_universe;
use stratos_core::ingest::{fetch_many, fetch_record};
use stratos_core::screening::{self, AppliedFilters};

const MAX_COMPARE: usize = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stocks/screen", get(screen_stocks))
        .route("/stocks/universe", get(universe))
        .route("/stocks/sectors", get(sectors))
        .route("/stocks/compare/:symbols", get(compare))
        .route("/stocks/:symbol", get(stock_details))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScreenQuery {
    pub sector: Option<String>,
    pub min_dividend_yield: Option<f64>,
    pub max_pe_ratio: Option<f64>,
    pub min_market_cap: Option<f64>,
    pub max_beta: Option<f64>,
    pub max_debt_to_equity: Option<f64>,
    /// Fill unset thresholds from the conservative defaults.
    #[serde(default)]
    pub use_defaults: bool,
}

impl ScreenQuery {
    fn criteria(self) -> ScreeningCriteria {
        let criteria = ScreeningCriteria {
            sector: self
                .sector
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            min_dividend_yield: self.min_dividend_yield,
            max_pe_ratio: self.max_pe_ratio,
            min_market_cap: self.min_market_cap,
            max_beta: self.max_beta,
            max_debt_to_equity: self.max_debt_to_equity,
        };
        if self.use_defaults {
            criteria.with_defaults()
        } else {
            criteria
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub stocks: Vec<StockRecord>,
    pub total: usize,
    pub filters_applied: AppliedFilters,
}

async fn screen_stocks(
    State(state): State<AppState>,
    Query(query): Query<ScreenQuery>,
) -> ApiResult<Json<ScreenResponse>> {
    let criteria = query.criteria();
    let records = fetch_many(state.source.as_ref(), &conservative_universe()).await;
    let stocks = screening::screen(&records, &criteria);

    tracing::info!(
        universe = records.len(),
        matched = stocks.len(),
        "screened conservative universe"
    );

    Ok(Json(ScreenResponse {
        total: stocks.len(),
        filters_applied: screening::applied_filters(&criteria),
        stocks,
    }))
}

async fn universe() -> Json<Vec<String>> {
    Json(conservative_universe())
}

async fn sectors(State(state): State<AppState>) -> Json<Vec<String>> {
    let records = fetch_many(state.source.as_ref(), &conservative_universe()).await;
    Json(screening::available_sectors(&records))
}

async fn stock_details(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<StockRecord>> {
    let symbol = normalize_symbol(&symbol);
    fetch_record(state.source.as_ref(), &symbol)
        .await
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Stock with symbol '{symbol}' not found or data unavailable"
            ))
        })
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub stocks: Vec<StockRecord>,
    pub count: usize,
}

async fn compare(
    State(state): State<AppState>,
    Path(symbols): Path<String>,
) -> ApiResult<Json<CompareResponse>> {
    let symbols = super::split_symbols(&symbols);
    if symbols.is_empty() {
        return Err(ApiError::bad_request("At least one stock symbol is required"));
    }
    if symbols.len() > MAX_COMPARE {
        return Err(ApiError::bad_request(format!(
            "Maximum {MAX_COMPARE} stocks can be compared at once"
        )));
    }

    let stocks = fetch_many(state.source.as_ref(), &symbols).await;
    if stocks.is_empty() {
        return Err(ApiError::not_found(
            "No stock data found for the provided symbols",
        ));
    }

    Ok(Json(CompareResponse {
        count: stocks.len(),
        stocks,
    }))
}
