use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use stratos_core::domain::user::{PreferencesInput, UserPreferences, DEFAULT_PREFERENCES_NAME};
use stratos_core::storage::preferences;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preferences", get(get_preferences).post(save_preferences))
        .route("/preferences/:name", delete(delete_preferences))
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Unknown names are created with the default thresholds on first read.
async fn get_preferences(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<UserPreferences>> {
    let pool = state.pool()?;
    let name = query
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PREFERENCES_NAME.to_string());
    Ok(Json(preferences::get_or_create_default(pool, &name).await?))
}

async fn save_preferences(
    State(state): State<AppState>,
    Json(input): Json<PreferencesInput>,
) -> ApiResult<Json<UserPreferences>> {
    let pool = state.pool()?;
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("preferences name must be non-empty"));
    }
    Ok(Json(preferences::upsert(pool, &input).await?))
}

async fn delete_preferences(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let pool = state.pool()?;
    if !preferences::delete(pool, &name).await? {
        return Err(ApiError::not_found("Preferences not found"));
    }
    Ok(Json(json!({ "message": format!("Preferences '{name}' deleted") })))
}
