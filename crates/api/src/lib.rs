//! HTTP surface. Stock and analysis routes only need a [`StockRecordSource`]; everything under
//! portfolio, preferences, watchlist and alerts needs the database and answers 503 without one.

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use stratos_core::ingest::StockRecordSource;
use stratos_core::recommendation::FallbackRecommender;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod routes;

use error::{ApiError, ApiResult};

pub const SERVICE_NAME: &str = "Stratos Investment Assistant API";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub source: Arc<dyn StockRecordSource>,
    pub recommender: FallbackRecommender,
}

impl AppState {
    pub fn new(
        pool: Option<PgPool>,
        source: Arc<dyn StockRecordSource>,
        recommender: FallbackRecommender,
    ) -> Self {
        Self {
            pool,
            source,
            recommender,
        }
    }

    pub fn pool(&self) -> ApiResult<&PgPool> {
        self.pool.as_ref().ok_or(ApiError::Unavailable)
    }
}

pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|e| anyhow::anyhow!("invalid CORS origin {cors_origin:?}: {e}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let api = Router::new()
        .merge(routes::stocks::router())
        .merge(routes::analysis::router())
        .merge(routes::portfolio::router())
        .merge(routes::preferences::router())
        .merge(routes::watchlist::router())
        .merge(routes::alerts::router());

    Ok(Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "stocks": "/api/v1/stocks",
            "alerts": "/api/v1/alerts",
            "analysis": "/api/v1/analysis",
            "portfolio": "/api/v1/portfolio",
            "preferences": "/api/v1/preferences",
            "watchlist": "/api/v1/watchlist",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "database": if state.pool.is_some() { "connected" } else { "unavailable" },
        "recommender": state.recommender.strategy_name(),
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
