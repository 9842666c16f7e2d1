use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::{Review, ReviewDetail, ReviewInput};
use crate::middleware::{parse_id, ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::reviews;
use crate::state::AppState;

/// GET /api/v1/reviews
pub async fn reviews_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    let listing = reviews::list(&state, &params).await?;
    Ok(ApiResponse::page(listing.data, listing.pagination))
}

/// GET /api/v1/bootcamps/:id/reviews
pub async fn bootcamp_reviews(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Review>> {
    let found = reviews::list_for_bootcamp(&state, parse_id(&id)?).await?;
    Ok(ApiResponse::collection(found))
}

/// GET /api/v1/reviews/:id
pub async fn review_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ReviewDetail> {
    let review = reviews::get(&state, parse_id(&id)?).await?;
    Ok(ApiResponse::success(review))
}

/// POST /api/v1/bootcamps/:id/reviews
pub async fn review_create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> ApiResult<Review> {
    let review = reviews::create(&state, &actor, parse_id(&id)?, input).await?;
    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn review_update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> ApiResult<Review> {
    let review = reviews::update(&state, &actor, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(review))
}

/// DELETE /api/v1/reviews/:id
pub async fn review_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    reviews::delete(&state, &actor, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}
