use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::{Bootcamp, BootcampInput};
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::bootcamps;
use crate::services::photos::{self, PhotoUpload};
use crate::state::AppState;

/// GET /api/v1/bootcamps
pub async fn bootcamps_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Value>> {
    let listing = bootcamps::list(&state, &params).await?;
    Ok(ApiResponse::page(listing.data, listing.pagination))
}

/// GET /api/v1/bootcamps/:id
pub async fn bootcamp_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Bootcamp> {
    let bootcamp = bootcamps::get(&state, parse_id(&id)?).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// POST /api/v1/bootcamps
pub async fn bootcamp_create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    ApiJson(input): ApiJson<BootcampInput>,
) -> ApiResult<Bootcamp> {
    let bootcamp = bootcamps::create(&state, &actor, input).await?;
    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id
pub async fn bootcamp_update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<BootcampInput>,
) -> ApiResult<Bootcamp> {
    let bootcamp = bootcamps::update(&state, &actor, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// DELETE /api/v1/bootcamps/:id
pub async fn bootcamp_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    bootcamps::delete(&state, &actor, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}

/// GET /api/v1/bootcamps/radius/:zipcode/:distance
pub async fn bootcamps_in_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> ApiResult<Vec<Bootcamp>> {
    let found = bootcamps::within_radius(&state, &zipcode, &distance).await?;
    Ok(ApiResponse::collection(found))
}

/// PUT /api/v1/bootcamps/:id/photo - multipart, field `file`
///
/// Ownership is settled before the body is read, so a stranger or a missing
/// bootcamp gets 401/404 however large the upload is.
pub async fn bootcamp_photo(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    multipart: Option<Multipart>,
) -> ApiResult<String> {
    let authorized = match parse_id(&id) {
        Ok(id) => photos::authorize_upload(&state, &actor, id).await,
        Err(e) => Err(e),
    };
    let bootcamp = match authorized {
        Ok(bootcamp) => bootcamp,
        Err(e) => {
            drain(multipart).await;
            return Err(e);
        }
    };

    let upload = read_upload(multipart, state.config.upload.max_file_upload).await?;
    let name = photos::store_photo(&state, &bootcamp, upload).await?;
    Ok(ApiResponse::success(name))
}

/// Pull the `file` field, keeping at most `max` bytes of it
async fn read_upload(multipart: Option<Multipart>, max: u64) -> Result<Option<PhotoUpload>, ApiError> {
    let Some(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);

        let mut bytes = Vec::new();
        let mut size: u64 = 0;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    size += chunk.len() as u64;
                    if size <= max {
                        bytes.extend_from_slice(&chunk);
                    }
                }
                Ok(None) => break,
                // Body limit hit after the file already went over `max`
                Err(_) if size > max => break,
                Err(e) => return Err(e.into()),
            }
        }
        if size > max {
            bytes.clear();
        }

        return Ok(Some(PhotoUpload { file_name, content_type, bytes, size }));
    }

    Ok(None)
}

/// Read and discard the rest of the body so the client gets the response
async fn drain(multipart: Option<Multipart>) {
    let Some(mut multipart) = multipart else {
        return;
    };
    while let Ok(Some(mut field)) = multipart.next_field().await {
        while let Ok(Some(_)) = field.chunk().await {}
    }
}
