use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use crate::database::models::{User, UserInput};
use crate::middleware::{parse_id, ApiJson, ApiResponse, ApiResult};
use crate::services::users;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn users_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    let listing = users::list(&state, &params).await?;
    Ok(ApiResponse::page(listing.data, listing.pagination))
}

/// GET /api/v1/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    Ok(ApiResponse::success(users::get(&state, parse_id(&id)?).await?))
}

/// POST /api/v1/users
pub async fn user_create(State(state): State<AppState>, ApiJson(input): ApiJson<UserInput>) -> ApiResult<User> {
    Ok(ApiResponse::created(users::create(&state, input).await?))
}

/// PUT /api/v1/users/:id
pub async fn user_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(users::update(&state, parse_id(&id)?, input).await?))
}

/// DELETE /api/v1/users/:id
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    users::delete(&state, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}
