use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use stratos_core::domain::user::{normalize_symbol, WatchlistInput, WatchlistItem};
use stratos_core::storage::watchlist;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(list_watchlist).post(add_to_watchlist))
        .route("/watchlist/:symbol", delete(remove_from_watchlist))
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

fn default_true() -> bool {
    true
}

async fn list_watchlist(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<Json<Vec<WatchlistItem>>> {
    let pool = state.pool()?;
    Ok(Json(watchlist::list(pool, query.active_only).await?))
}

/// Re-adding an existing symbol reactivates it instead of creating a duplicate.
async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(input): Json<WatchlistInput>,
) -> ApiResult<Json<WatchlistItem>> {
    let pool = state.pool()?;
    if normalize_symbol(&input.symbol).is_empty() {
        return Err(ApiError::bad_request("symbol must be non-empty"));
    }
    Ok(Json(watchlist::upsert(pool, &input).await?))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = state.pool()?;
    let symbol = normalize_symbol(&symbol);
    if !watchlist::deactivate(pool, &symbol).await? {
        return Err(ApiError::not_found("Stock not in watchlist"));
    }
    Ok(Json(json!({ "message": format!("{symbol} removed from watchlist") })))
}
